pub mod byte_reader_ext;
pub mod charset;
pub mod column_metadata;
pub mod column_parser;
pub mod column_type;
pub mod column_value;
pub mod column_value_unified;
pub mod custom_decoder;
pub mod decoders;
pub mod performance;
pub mod string_optimization;
pub mod type_decoder;
