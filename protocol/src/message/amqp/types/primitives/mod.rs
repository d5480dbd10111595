mod list;
mod map;
mod simple;
mod value;

pub(crate) use list::{
    decode_field, described_list, expect_descriptor, read_list_header,
};
pub use list::List;
pub use map::Map;
pub(crate) use simple::{read_utf8, variable_width_size, write_variable_width};
pub use simple::*;
pub use value::*;
