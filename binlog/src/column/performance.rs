use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use crate::column::column_value_unified::ColumnValue;

/// Performance optimization system for column parsing
pub struct ColumnParsingPerformanceOptimizer {
    cache: Arc<Mutex<ParseCache>>,
    stats: Arc<Mutex<PerformanceStats>>,
    config: PerformanceConfig,
}

/// Configuration for performance optimizations
#[derive(Debug, Clone)]
pub struct PerformanceConfig {
    /// Enable result caching for frequently parsed values
    pub enable_caching: bool,
    /// Maximum number of cached results
    pub max_cache_size: usize,
    /// Enable performance monitoring
    pub enable_monitoring: bool,
    /// Enable type-specific optimizations
    pub enable_type_optimizations: bool,
    /// Cache TTL in seconds
    pub cache_ttl_seconds: u64,
    /// Minimum parse time to consider for caching (microseconds)
    pub min_cache_parse_time_us: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            enable_caching: true,
            max_cache_size: 10000,
            enable_monitoring: true,
            enable_type_optimizations: true,
            cache_ttl_seconds: 300, // 5 minutes
            min_cache_parse_time_us: 100, // 100 microseconds
        }
    }
}

/// Cache for parsed column values
struct ParseCache {
    entries: HashMap<CacheKey, CacheEntry>,
    access_order: Vec<CacheKey>,
    config: PerformanceConfig,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct CacheKey {
    column_type: u8,
    metadata: u16,
    data_hash: u64,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: ColumnValue,
    created_at: Instant,
    access_count: u64,
    last_accessed: Instant,
    parse_time_ns: u64,
}

/// Performance statistics
#[derive(Debug, Default, Clone)]
pub struct PerformanceStats {
    pub total_parses: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub total_parse_time_ns: u64,
    pub avg_parse_time_ns: u64,
    pub type_stats: HashMap<u8, TypePerformanceStats>,
    pub optimization_stats: OptimizationStats,
}

#[derive(Debug, Default, Clone)]
pub struct TypePerformanceStats {
    pub parse_count: u64,
    pub total_time_ns: u64,
    pub avg_time_ns: u64,
    pub min_time_ns: u64,
    pub max_time_ns: u64,
    pub cache_hit_rate: f64,
}

#[derive(Debug, Default, Clone)]
pub struct OptimizationStats {
    pub fast_path_hits: u64,
    pub slow_path_hits: u64,
    pub optimization_time_saved_ns: u64,
}

impl ColumnParsingPerformanceOptimizer {
    pub fn new(config: PerformanceConfig) -> Self {
        Self {
            cache: Arc::new(Mutex::new(ParseCache::new(config.clone()))),
            stats: Arc::new(Mutex::new(PerformanceStats::default())),
            config,
        }
    }

    /// Attempt to get a cached result
    pub fn get_cached_result(&self, column_type: u8, metadata: u16, data: &[u8]) -> Option<ColumnValue> {
        if !self.config.enable_caching {
            return None;
        }

        let cache_key = CacheKey {
            column_type,
            metadata,
            data_hash: self.hash_data(data),
        };

        let mut cache = self.cache.lock().ok()?;
        let mut stats = self.stats.lock().ok()?;

        if let Some(entry) = cache.get_mut(&cache_key) {
            // Check if entry is still valid
            if entry.created_at.elapsed().as_secs() <= self.config.cache_ttl_seconds {
                entry.access_count += 1;
                entry.last_accessed = Instant::now();
                
                stats.cache_hits += 1;
                stats.total_parses += 1;
                
                // Update type stats
                let cache_hits = stats.cache_hits;
                let total_parses = stats.total_parses;
                let type_stats = stats.type_stats.entry(column_type).or_default();
                type_stats.parse_count += 1;
                type_stats.cache_hit_rate = cache_hits as f64 / total_parses as f64;
                
                return Some(entry.value.clone());
            } else {
                // Entry expired, remove it
                cache.remove(&cache_key);
            }
        }

        stats.cache_misses += 1;
        None
    }

    /// Cache a parsing result
    pub fn cache_result(&self, column_type: u8, metadata: u16, data: &[u8], value: ColumnValue, parse_time: Duration) {
        if !self.config.enable_caching {
            return;
        }

        let parse_time_us = parse_time.as_micros() as u64;
        
        // Only cache if parse time exceeds threshold
        if parse_time_us < self.config.min_cache_parse_time_us {
            return;
        }

        let cache_key = CacheKey {
            column_type,
            metadata,
            data_hash: self.hash_data(data),
        };

        let cache_entry = CacheEntry {
            value,
            created_at: Instant::now(),
            access_count: 1,
            last_accessed: Instant::now(),
            parse_time_ns: parse_time.as_nanos() as u64,
        };

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(cache_key, cache_entry);
        }
    }

    /// Record parsing performance statistics
    pub fn record_parse_stats(&self, column_type: u8, parse_time: Duration, used_fast_path: bool) {
        if !self.config.enable_monitoring {
            return;
        }

        if let Ok(mut stats) = self.stats.lock() {
            let parse_time_ns = parse_time.as_nanos() as u64;
            
            stats.total_parses += 1;
            stats.total_parse_time_ns += parse_time_ns;
            stats.avg_parse_time_ns = stats.total_parse_time_ns / stats.total_parses;

            // Update type-specific stats
            let type_stats = stats.type_stats.entry(column_type).or_default();
            type_stats.parse_count += 1;
            type_stats.total_time_ns += parse_time_ns;
            type_stats.avg_time_ns = type_stats.total_time_ns / type_stats.parse_count;
            
            if type_stats.min_time_ns == 0 || parse_time_ns < type_stats.min_time_ns {
                type_stats.min_time_ns = parse_time_ns;
            }
            if parse_time_ns > type_stats.max_time_ns {
                type_stats.max_time_ns = parse_time_ns;
            }

            // Update optimization stats
            if used_fast_path {
                stats.optimization_stats.fast_path_hits += 1;
            } else {
                stats.optimization_stats.slow_path_hits += 1;
            }
        }
    }

    /// Get performance statistics
    pub fn get_stats(&self) -> Option<PerformanceStats> {
        self.stats.lock().ok().map(|stats| stats.clone())
    }

    /// Clear cache and reset statistics
    pub fn reset(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
        if let Ok(mut stats) = self.stats.lock() {
            *stats = PerformanceStats::default();
        }
    }

    /// Get cache statistics
    pub fn get_cache_stats(&self) -> Option<CacheStats> {
        let cache = self.cache.lock().ok()?;
        Some(CacheStats {
            size: cache.entries.len(),
            max_size: self.config.max_cache_size,
            hit_rate: if cache.entries.is_empty() { 0.0 } else {
                cache.entries.values().map(|e| e.access_count).sum::<u64>() as f64 / cache.entries.len() as f64
            },
        })
    }

    /// Optimize cache by removing least recently used entries
    pub fn optimize_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.evict_lru();
        }
    }

    /// Hash data for cache key
    fn hash_data(&self, data: &[u8]) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        hasher.finish()
    }
}

impl ParseCache {
    fn new(config: PerformanceConfig) -> Self {
        Self {
            entries: HashMap::new(),
            access_order: Vec::new(),
            config,
        }
    }

    fn get_mut(&mut self, key: &CacheKey) -> Option<&mut CacheEntry> {
        if let Some(entry) = self.entries.get_mut(key) {
            // Update access order
            if let Some(pos) = self.access_order.iter().position(|k| k == key) {
                self.access_order.remove(pos);
            }
            self.access_order.push(key.clone());
            Some(entry)
        } else {
            None
        }
    }

    fn insert(&mut self, key: CacheKey, entry: CacheEntry) {
        // Check if we need to evict entries
        if self.entries.len() >= self.config.max_cache_size {
            self.evict_lru();
        }

        self.entries.insert(key.clone(), entry);
        self.access_order.push(key);
    }

    fn remove(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            self.access_order.remove(pos);
        }
        self.entries.remove(key)
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.access_order.clear();
    }

    fn evict_lru(&mut self) {
        // Remove oldest entries until we're under the limit
        let target_size = (self.config.max_cache_size as f64 * 0.8) as usize; // Remove 20% when full
        
        while self.entries.len() > target_size && !self.access_order.is_empty() {
            if let Some(oldest_key) = self.access_order.first().cloned() {
                self.remove(&oldest_key);
            }
        }
    }
}

#[derive(Debug)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub hit_rate: f64,
}

/// Type-specific optimization strategies
pub struct TypeOptimizations;

impl TypeOptimizations {
    /// Check if a column type can use fast path optimization
    pub fn can_use_fast_path(column_type: u8, data_length: usize) -> bool {
        match column_type {
            // Numeric types with fixed sizes can use fast path
            1 => data_length == 1,  // TINYINT
            2 => data_length == 2,  // SMALLINT
            3 => data_length == 4,  // INT
            8 => data_length == 8,  // BIGINT
            4 => data_length == 4,  // FLOAT
            5 => data_length == 8,  // DOUBLE
            13 => data_length == 1, // YEAR
            _ => false,
        }
    }

    /// Get optimization hints for a column type
    pub fn get_optimization_hints(column_type: u8) -> OptimizationHints {
        match column_type {
            // Numeric types
            1..=8 | 13 => OptimizationHints {
                prefer_inline: true,
                cacheable: false, // Simple types don't need caching
                use_simd: false,
                expected_parse_time_ns: 50,
            },
            // String types
            15 | 253 | 254 => OptimizationHints {
                prefer_inline: false,
                cacheable: true,
                use_simd: true, // For string operations
                expected_parse_time_ns: 500,
            },
            // Complex types
            245 | 255 => OptimizationHints { // JSON, GEOMETRY
                prefer_inline: false,
                cacheable: true,
                use_simd: false,
                expected_parse_time_ns: 5000,
            },
            _ => OptimizationHints::default(),
        }
    }

    /// Estimate parsing complexity
    pub fn estimate_complexity(column_type: u8, data_length: usize) -> ParseComplexity {
        let base_complexity = match column_type {
            1..=8 | 13 => ParseComplexity::Low,
            15 | 253 | 254 => ParseComplexity::Medium,
            245 | 255 => ParseComplexity::High,
            _ => ParseComplexity::Medium,
        };

        // Adjust based on data length
        match base_complexity {
            ParseComplexity::Low => base_complexity,
            ParseComplexity::Medium => {
                if data_length > 1000 {
                    ParseComplexity::High
                } else {
                    base_complexity
                }
            }
            ParseComplexity::High => {
                if data_length > 10000 {
                    ParseComplexity::VeryHigh
                } else {
                    base_complexity
                }
            }
            ParseComplexity::VeryHigh => base_complexity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OptimizationHints {
    pub prefer_inline: bool,
    pub cacheable: bool,
    pub use_simd: bool,
    pub expected_parse_time_ns: u64,
}

impl Default for OptimizationHints {
    fn default() -> Self {
        Self {
            prefer_inline: false,
            cacheable: true,
            use_simd: false,
            expected_parse_time_ns: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseComplexity {
    Low,      // Simple numeric types
    Medium,   // String types, dates
    High,     // JSON, complex types
    VeryHigh, // Large complex types
}

/// Performance monitoring utilities
pub struct PerformanceMonitor {
    start_time: Instant,
    checkpoints: Vec<(String, Instant)>,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            checkpoints: Vec::new(),
        }
    }

    pub fn checkpoint(&mut self, name: &str) {
        self.checkpoints.push((name.to_string(), Instant::now()));
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn get_checkpoint_durations(&self) -> Vec<(String, Duration)> {
        let mut result = Vec::new();
        let mut prev_time = self.start_time;

        for (name, time) in &self.checkpoints {
            result.push((name.clone(), time.duration_since(prev_time)));
            prev_time = *time;
        }

        result
    }

    pub fn total_checkpoint_time(&self) -> Duration {
        if let Some((_, last_time)) = self.checkpoints.last() {
            last_time.duration_since(self.start_time)
        } else {
            Duration::from_nanos(0)
        }
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::column_value_unified::ColumnValue;

    #[test]
    fn test_performance_optimizer_caching() {
        let config = PerformanceConfig::default();
        let optimizer = ColumnParsingPerformanceOptimizer::new(config);

        let test_data = b"test_data";
        let test_value = ColumnValue::VarChar("test".to_string());

        // First access should be a cache miss
        assert!(optimizer.get_cached_result(15, 100, test_data).is_none());

        // Cache the result
        optimizer.cache_result(15, 100, test_data, test_value.clone(), Duration::from_micros(200));

        // Second access should be a cache hit
        let cached = optimizer.get_cached_result(15, 100, test_data);
        assert!(cached.is_some());
        assert_eq!(cached.unwrap(), test_value);

        // Verify stats
        let stats = optimizer.get_stats().unwrap();
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses, 1);
    }

    #[test]
    fn test_type_optimizations() {
        assert!(TypeOptimizations::can_use_fast_path(1, 1)); // TINYINT
        assert!(!TypeOptimizations::can_use_fast_path(1, 2)); // Wrong size
        assert!(!TypeOptimizations::can_use_fast_path(245, 100)); // JSON

        let hints = TypeOptimizations::get_optimization_hints(1);
        assert!(hints.prefer_inline);
        assert!(!hints.cacheable);

        let complexity = TypeOptimizations::estimate_complexity(245, 5000);
        assert_eq!(complexity, ParseComplexity::High);
    }

    #[test]
    fn test_performance_monitor() {
        let mut monitor = PerformanceMonitor::new();
        
        std::thread::sleep(Duration::from_millis(1));
        monitor.checkpoint("step1");
        
        std::thread::sleep(Duration::from_millis(1));
        monitor.checkpoint("step2");

        let durations = monitor.get_checkpoint_durations();
        assert_eq!(durations.len(), 2);
        assert!(durations[0].1 > Duration::from_nanos(0));
        assert!(durations[1].1 > Duration::from_nanos(0));
    }
}