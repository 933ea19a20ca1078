pub(crate) mod bert;
pub(crate) mod modernbert;
pub(crate) mod t5;
