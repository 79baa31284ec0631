use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use common::err::CResult;

/// ERR_Packet body, parsed from the bytes following the `0xff` header byte.
#[derive(Debug)]
pub struct ErrorPacket {
    pub error_code: u16,
    pub sql_state: String,
    pub error_message: String,
}

impl ErrorPacket {
    pub fn parse(packet: &[u8]) -> CResult<Self> {
        let mut cursor = Cursor::new(packet);

        let error_code = cursor.read_u16::<LittleEndian>()?;

        let position = cursor.position() as usize;
        let rest = &packet[position..];

        // Protocol 4.1 prefixes a '#' + 5-byte SQL state before the message.
        let (sql_state, message_start) = if rest.first() == Some(&b'#') && rest.len() >= 6 {
            (String::from_utf8_lossy(&rest[1..6]).to_string(), 6)
        } else {
            (String::new(), 0)
        };

        let error_message = String::from_utf8_lossy(&rest[message_start..]).to_string();

        Ok(Self {
            error_code,
            sql_state,
            error_message,
        })
    }
}
