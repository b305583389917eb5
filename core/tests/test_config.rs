#[cfg(test)]
mod tests {
    use sealstream_core::constants::{
        DEFAULT_BUFFER_CAPACITY, DEFAULT_COMPRESSION_LEVEL, DEFAULT_SCRATCH_CACHE_LIMIT,
    };
    use sealstream_core::prelude::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = WriterConfig::default();
        assert_eq!(config.strategy, CipherStrategy::Cached);
        assert!(!config.buffered);
        assert_eq!(config.buffer_capacity, DEFAULT_BUFFER_CAPACITY);
        assert_eq!(config.scratch_cache_limit, DEFAULT_SCRATCH_CACHE_LIMIT);
        assert_eq!(config.compression_level, DEFAULT_COMPRESSION_LEVEL);
        assert_eq!(config.delimiter, b',');
        assert!(!config.use_crlf);
        assert!(!config.flexible);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builders_set_fields() {
        let config = WriterConfig::new(CipherStrategy::InPlace)
            .with_buffer(1024)
            .with_scratch_cache_limit(8)
            .with_compression_level(9)
            .with_delimiter(b'\t')
            .with_crlf(true)
            .with_flexible(true);

        assert_eq!(config.strategy, CipherStrategy::InPlace);
        assert!(config.buffered);
        assert_eq!(config.buffer_capacity, 1024);
        assert_eq!(config.scratch_cache_limit, 8);
        assert_eq!(config.compression_level, 9);
        assert_eq!(config.delimiter, b'\t');
        assert!(config.use_crlf && config.flexible);
        assert!(config.validate().is_ok());

        let switched = config.with_strategy(CipherStrategy::Cached);
        assert_eq!(switched.strategy, CipherStrategy::Cached);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let cases = [
            WriterConfig::default().with_compression_level(10),
            WriterConfig::default().with_delimiter(b'"'),
            WriterConfig::default().with_delimiter(b'\n'),
            WriterConfig::default().with_delimiter(b'\r'),
            WriterConfig::default().with_buffer(0),
            WriterConfig::default().with_scratch_cache_limit(0),
        ];
        for config in cases {
            match config.validate() {
                Err(StreamError::Config(_)) => {}
                other => panic!("expected Config error for {:?}, got {:?}", config, other),
            }
        }
    }

    #[test]
    fn zero_capacity_is_fine_when_unbuffered() {
        let mut config = WriterConfig::default();
        config.buffer_capacity = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_round_trip_and_partial_documents() {
        let config = WriterConfig::new(CipherStrategy::InPlace).with_buffer(2048);
        let json = serde_json::to_string(&config).expect("to json");
        assert!(json.contains("\"strategy\":\"in_place\""));
        let back: WriterConfig = serde_json::from_str(&json).expect("from json");
        assert_eq!(back, config);

        let partial: WriterConfig =
            serde_json::from_str(r#"{ "strategy": "in_place", "flexible": true }"#)
                .expect("partial");
        assert_eq!(partial.strategy, CipherStrategy::InPlace);
        assert!(partial.flexible);
        assert_eq!(partial.compression_level, DEFAULT_COMPRESSION_LEVEL);
        assert_eq!(partial.buffer_capacity, DEFAULT_BUFFER_CAPACITY);
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let res: Result<WriterConfig, _> = serde_json::from_str(r#"{ "strategy": "bogus" }"#);
        assert!(res.is_err());
    }
}
