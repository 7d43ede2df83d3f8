pub mod channels;
pub mod status;
