pub mod decode_error;

use crate::err::decode_error::ReError;

pub type CResult<T> = Result<T, ReError>;
