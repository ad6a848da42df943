pub(crate) mod extract;
pub(crate) mod map;
pub(crate) mod space;
pub(crate) mod value;
