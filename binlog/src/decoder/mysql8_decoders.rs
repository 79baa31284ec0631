use std::collections::HashMap;
use std::io::Cursor;
use common::err::decode_error::{ReError, ErrorContext};
use crate::b_type::LogEventType;
use crate::events::binlog_event::BinlogEvent;
use crate::events::event_raw::HeaderRef;
use crate::events::log_context::LogContextRef;
use crate::events::declare::log_event::LogEvent;
use crate::decoder::table_cache_manager::TableCacheManager;
use crate::decoder::event_decoder_registry::{EventDecoder, DecoderPriority};
use crate::events::protocol::table_map_event::TableMapEvent;
use crate::events::event_header::Header;

/// Decoder for TRANSACTION_PAYLOAD_EVENT (MySQL 8.0.20+)
/// This event contains compressed transaction data
#[derive(Debug)]
pub struct TransactionPayloadEventDecoder;

impl EventDecoder for TransactionPayloadEventDecoder {
    fn event_type(&self) -> u8 { LogEventType::TRANSACTION_PAYLOAD_EVENT.as_u8() }
    fn name(&self) -> &'static str { "TransactionPayloadEventDecoder" }
    fn priority(&self) -> DecoderPriority { DecoderPriority::High }

    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        header: HeaderRef,
        _context: LogContextRef,
        _table_map: Option<&HashMap<u64, TableMapEvent>>,
        _table_cache_manager: Option<&TableCacheManager>,
    ) -> Result<BinlogEvent, ReError> {
        // For now, we'll create a placeholder implementation
        // In a full implementation, this would decompress and parse the contained events
        
        let error_context = ErrorContext::new()
            .with_event_type(self.event_type())
            .with_position(header.borrow().get_log_pos())
            .with_operation("decode_transaction_payload".to_string());

        // Read the payload header (simplified implementation)
        let remaining_data = cursor.get_ref().len() - cursor.position() as usize;
        
        if remaining_data < 8 {
            return Err(ReError::invalid_data_format_with_length(
                "TransactionPayloadEvent too short".to_string(),
                error_context,
                Some(8),
                Some(remaining_data)
            ));
        }

        // Skip the payload data for now - in a real implementation we would:
        // 1. Read the compression type
        // 2. Read the uncompressed size
        // 3. Decompress the payload
        // 4. Parse the contained events
        
        Ok(BinlogEvent::TRANSACTION_PAYLOAD)
    }
}

/// Decoder for PARTIAL_UPDATE_ROWS_EVENT (MySQL 8.0+)
/// This event allows partial row updates with only changed columns
#[derive(Debug)]
pub struct PartialUpdateRowsEventDecoder;

impl EventDecoder for PartialUpdateRowsEventDecoder {
    fn event_type(&self) -> u8 { LogEventType::PARTIAL_UPDATE_ROWS_EVENT.as_u8() }
    fn name(&self) -> &'static str { "PartialUpdateRowsEventDecoder" }
    fn priority(&self) -> DecoderPriority { DecoderPriority::High }

    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        header: HeaderRef,
        context: LogContextRef,
        table_map: Option<&HashMap<u64, TableMapEvent>>,
        _table_cache_manager: Option<&TableCacheManager>,
    ) -> Result<BinlogEvent, ReError> {
        let error_context = ErrorContext::new()
            .with_event_type(self.event_type())
            .with_position(header.borrow().get_log_pos())
            .with_operation("decode_partial_update_rows".to_string());

        // For now, we'll treat this as a regular UPDATE_ROWS_EVENT
        // In a full implementation, this would:
        // 1. Parse the partial column bitmap
        // 2. Only read the changed columns
        // 3. Reconstruct the full row data
        
        // Try to parse as a regular update event for compatibility
        use crate::events::protocol::update_rows_v12_event::UpdateRowsEvent;
        
        match UpdateRowsEvent::parse(cursor, header.clone(), context.clone(), table_map, None) {
            Ok(event) => Ok(BinlogEvent::UpdateRows(event)),
            Err(e) => {
                // If regular parsing fails, return a placeholder
                Err(ReError::event_parse_error_with_source(
                    "Failed to parse PartialUpdateRowsEvent as UpdateRowsEvent".to_string(),
                    error_context,
                    e
                ))
            }
        }
    }
}

/// Decoder for HEARTBEAT_LOG_EVENT_V2 (MySQL 8.0.26+)
/// Enhanced heartbeat event with additional metadata
#[derive(Debug)]
pub struct HeartbeatLogEventV2Decoder;

impl EventDecoder for HeartbeatLogEventV2Decoder {
    fn event_type(&self) -> u8 { LogEventType::HEARTBEAT_LOG_EVENT_V2.as_u8() }
    fn name(&self) -> &'static str { "HeartbeatLogEventV2Decoder" }
    fn priority(&self) -> DecoderPriority { DecoderPriority::Normal }

    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        header: HeaderRef,
        _context: LogContextRef,
        _table_map: Option<&HashMap<u64, TableMapEvent>>,
        _table_cache_manager: Option<&TableCacheManager>,
    ) -> Result<BinlogEvent, ReError> {
        let error_context = ErrorContext::new()
            .with_event_type(self.event_type())
            .with_position(header.borrow().get_log_pos())
            .with_operation("decode_heartbeat_v2".to_string());

        // Read the enhanced heartbeat data
        let remaining_data = cursor.get_ref().len() - cursor.position() as usize;
        
        if remaining_data < 4 {
            return Err(ReError::invalid_data_format_with_length(
                "HeartbeatLogEventV2 too short".to_string(),
                error_context,
                Some(4),
                Some(remaining_data)
            ));
        }

        // For now, we'll create a basic heartbeat event
        // In a full implementation, this would parse additional V2 metadata
        Ok(BinlogEvent::HEARTBEAT_LOG_V2)
    }
}

/// Decoder for TRANSACTION_CONTEXT_EVENT (MySQL 5.7+, enhanced in 8.0)
/// Contains transaction context information
#[derive(Debug)]
pub struct TransactionContextEventDecoder;

impl EventDecoder for TransactionContextEventDecoder {
    fn event_type(&self) -> u8 { LogEventType::TRANSACTION_CONTEXT_EVENT.as_u8() }
    fn name(&self) -> &'static str { "TransactionContextEventDecoder" }
    fn priority(&self) -> DecoderPriority { DecoderPriority::Normal }

    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        header: HeaderRef,
        _context: LogContextRef,
        _table_map: Option<&HashMap<u64, TableMapEvent>>,
        _table_cache_manager: Option<&TableCacheManager>,
    ) -> Result<BinlogEvent, ReError> {
        let error_context = ErrorContext::new()
            .with_event_type(self.event_type())
            .with_position(header.borrow().get_log_pos())
            .with_operation("decode_transaction_context".to_string());

        // Read basic transaction context data
        let remaining_data = cursor.get_ref().len() - cursor.position() as usize;
        
        if remaining_data < 8 {
            return Err(ReError::invalid_data_format_with_length(
                "TransactionContextEvent too short".to_string(),
                error_context,
                Some(8),
                Some(remaining_data)
            ));
        }

        // For now, return a placeholder
        // In a full implementation, this would parse:
        // - Server UUID
        // - Thread ID
        // - Sequence number
        // - Other transaction metadata
        
        Ok(BinlogEvent::TRANSACTION_CONTEXT)
    }
}

/// Decoder for VIEW_CHANGE_EVENT (MySQL Group Replication)
/// Used in MySQL Group Replication for view changes
#[derive(Debug)]
pub struct ViewChangeEventDecoder;

impl EventDecoder for ViewChangeEventDecoder {
    fn event_type(&self) -> u8 { LogEventType::VIEW_CHANGE_EVENT.as_u8() }
    fn name(&self) -> &'static str { "ViewChangeEventDecoder" }
    fn priority(&self) -> DecoderPriority { DecoderPriority::Normal }

    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        header: HeaderRef,
        _context: LogContextRef,
        _table_map: Option<&HashMap<u64, TableMapEvent>>,
        _table_cache_manager: Option<&TableCacheManager>,
    ) -> Result<BinlogEvent, ReError> {
        let error_context = ErrorContext::new()
            .with_event_type(self.event_type())
            .with_position(header.borrow().get_log_pos())
            .with_operation("decode_view_change".to_string());

        // Read view change data
        let remaining_data = cursor.get_ref().len() - cursor.position() as usize;
        
        if remaining_data < 16 {
            return Err(ReError::invalid_data_format_with_length(
                "ViewChangeEvent too short".to_string(),
                error_context,
                Some(16),
                Some(remaining_data)
            ));
        }

        // For now, return a placeholder
        // In a full implementation, this would parse:
        // - View ID
        // - Certification info
        // - Member information
        
        Ok(BinlogEvent::VIEW_CHANGE)
    }
}

/// Decoder for XA_PREPARE_LOG_EVENT (MySQL 5.7+)
/// XA transaction prepare event
#[derive(Debug)]
pub struct XaPrepareLogEventDecoder;

impl EventDecoder for XaPrepareLogEventDecoder {
    fn event_type(&self) -> u8 { LogEventType::XA_PREPARE_LOG_EVENT.as_u8() }
    fn name(&self) -> &'static str { "XaPrepareLogEventDecoder" }
    fn priority(&self) -> DecoderPriority { DecoderPriority::High }

    fn decode(
        &self,
        cursor: &mut Cursor<&[u8]>,
        header: HeaderRef,
        _context: LogContextRef,
        _table_map: Option<&HashMap<u64, TableMapEvent>>,
        _table_cache_manager: Option<&TableCacheManager>,
    ) -> Result<BinlogEvent, ReError> {
        let error_context = ErrorContext::new()
            .with_event_type(self.event_type())
            .with_position(header.borrow().get_log_pos())
            .with_operation("decode_xa_prepare".to_string());

        // Read XA prepare data
        let remaining_data = cursor.get_ref().len() - cursor.position() as usize;
        
        if remaining_data < 8 {
            return Err(ReError::invalid_data_format_with_length(
                "XaPrepareLogEvent too short".to_string(),
                error_context,
                Some(8),
                Some(remaining_data)
            ));
        }

        // For now, return a placeholder
        // In a full implementation, this would parse:
        // - XID format
        // - XID gtrid length
        // - XID bqual length
        // - XID data
        
        Ok(BinlogEvent::XA_PREPARE_LOG)
    }
}

/// Function to register MySQL 8.0 specific decoders
pub fn register_mysql8_decoders(registry: &crate::decoder::event_decoder_registry::EventDecoderRegistry) -> Result<(), ReError> {
    // Register MySQL 8.0+ specific event decoders
    registry.register_decoder(Box::new(TransactionPayloadEventDecoder))?;
    registry.register_decoder(Box::new(PartialUpdateRowsEventDecoder))?;
    registry.register_decoder(Box::new(HeartbeatLogEventV2Decoder))?;
    registry.register_decoder(Box::new(TransactionContextEventDecoder))?;
    registry.register_decoder(Box::new(ViewChangeEventDecoder))?;
    registry.register_decoder(Box::new(XaPrepareLogEventDecoder))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::event_decoder_registry::EventDecoderRegistry;

    #[test]
    fn test_mysql8_decoder_registration() {
        let registry = EventDecoderRegistry::new();
        
        // Test registration of MySQL 8.0 decoders
        assert!(register_mysql8_decoders(&registry).is_ok());
        
        // Verify that the decoders are registered
        assert!(registry.has_decoder(LogEventType::TRANSACTION_PAYLOAD_EVENT.as_u8()));
        assert!(registry.has_decoder(LogEventType::PARTIAL_UPDATE_ROWS_EVENT.as_u8()));
        assert!(registry.has_decoder(LogEventType::HEARTBEAT_LOG_EVENT_V2.as_u8()));
        assert!(registry.has_decoder(LogEventType::TRANSACTION_CONTEXT_EVENT.as_u8()));
        assert!(registry.has_decoder(LogEventType::VIEW_CHANGE_EVENT.as_u8()));
        assert!(registry.has_decoder(LogEventType::XA_PREPARE_LOG_EVENT.as_u8()));
    }

    #[test]
    fn test_decoder_priorities() {
        let transaction_decoder = TransactionPayloadEventDecoder;
        let partial_update_decoder = PartialUpdateRowsEventDecoder;
        let xa_prepare_decoder = XaPrepareLogEventDecoder;
        
        // Verify that critical decoders have high priority
        assert_eq!(transaction_decoder.priority(), DecoderPriority::High);
        assert_eq!(partial_update_decoder.priority(), DecoderPriority::High);
        assert_eq!(xa_prepare_decoder.priority(), DecoderPriority::High);
    }
}