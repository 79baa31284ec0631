use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use binlog::utils::read_null_term_string_with_cursor;
use common::err::CResult;

use crate::declar::capability_flags::CLIENT_PLUGIN_AUTH;
use crate::declar::capability_flags::CLIENT_SECURE_CONNECTION;

/// Initial_Handshake_Packet (protocol version 10), sent by the server as the
/// first packet of a connection.
///
/// ref: https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_connection_phase_packets_protocol_handshake_v10.html
#[derive(Debug)]
pub struct HandshakePacket {
    pub protocol_version: u8,
    pub server_version: String,
    pub connection_id: u32,
    pub scramble: String,
    pub server_capabilities: u64,
    pub server_collation: u8,
    pub status_flags: u16,
    pub auth_plugin_name: String,
}

impl HandshakePacket {
    pub fn parse(packet: &[u8]) -> CResult<Self> {
        let mut cursor = Cursor::new(packet);

        let protocol_version = cursor.read_u8()?;
        let server_version = read_null_term_string_with_cursor(&mut cursor)?;
        let connection_id = cursor.read_u32::<LittleEndian>()?;

        let mut auth_plugin_data = [0u8; 8];
        cursor.read_exact(&mut auth_plugin_data)?;
        let mut scramble = auth_plugin_data.to_vec();

        // filler
        cursor.read_u8()?;

        let capability_flags_lower = cursor.read_u16::<LittleEndian>()? as u64;

        let server_collation = cursor.read_u8()?;
        let status_flags = cursor.read_u16::<LittleEndian>()?;
        let capability_flags_upper = cursor.read_u16::<LittleEndian>()? as u64;

        let server_capabilities = capability_flags_lower | (capability_flags_upper << 16);

        let auth_plugin_data_len = cursor.read_u8()?;

        // 10 reserved/filler bytes
        let mut reserved = [0u8; 10];
        cursor.read_exact(&mut reserved)?;

        if server_capabilities & CLIENT_SECURE_CONNECTION != 0 {
            let part_2_len = std::cmp::max(13, auth_plugin_data_len as i8 - 8) as usize;
            let mut part_2 = vec![0u8; part_2_len];
            cursor.read_exact(&mut part_2)?;
            // drop the trailing null terminator included in the fixed-length field
            if part_2.last() == Some(&0) {
                part_2.pop();
            }
            scramble.extend_from_slice(&part_2);
        }

        let auth_plugin_name = if server_capabilities & CLIENT_PLUGIN_AUTH != 0 {
            read_null_term_string_with_cursor(&mut cursor)?
        } else {
            String::new()
        };

        Ok(Self {
            protocol_version,
            server_version,
            connection_id,
            scramble: String::from_utf8_lossy(&scramble).to_string(),
            server_capabilities,
            server_collation,
            status_flags,
            auth_plugin_name,
        })
    }
}
