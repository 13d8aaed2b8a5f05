// Column order is the COPY order, keep it in sync with `ddl.rs`.

diesel::table! {
    raw.ethereum_logs (tx_hash, log_index) {
        tx_hash -> Text,
        block_number -> Int8,
        timestamp -> Int8,
        datetime -> Nullable<Timestamptz>,
        from_address -> Nullable<Text>,
        to_address -> Nullable<Text>,
        message_hash -> Nullable<Text>,
        value_eth -> Nullable<Numeric>,
        fee_eth -> Nullable<Numeric>,
        nonce -> Nullable<Int8>,
        gas_price -> Int8,
        gas_used -> Int8,
        log_index -> Int8,
        tx_index -> Int8,
        blockchain -> Text,
        api_extracted_start_date -> Date,
        api_extracted_end_date -> Date,
        source_file -> Text,
        loaded_at -> Timestamptz,
    }
}

diesel::table! {
    raw.linea_logs (tx_hash, log_index) {
        tx_hash -> Text,
        block_number -> Int8,
        timestamp -> Int8,
        datetime -> Nullable<Timestamptz>,
        from_address -> Nullable<Text>,
        to_address -> Nullable<Text>,
        message_hash -> Nullable<Text>,
        value_eth -> Nullable<Numeric>,
        fee_eth -> Nullable<Numeric>,
        nonce -> Nullable<Int8>,
        gas_price -> Int8,
        gas_used -> Int8,
        log_index -> Int8,
        tx_index -> Int8,
        blockchain -> Text,
        api_extracted_start_date -> Date,
        api_extracted_end_date -> Date,
        source_file -> Text,
        loaded_at -> Timestamptz,
    }
}

diesel::table! {
    raw.ethereum_transactions (hash) {
        hash -> Text,
        datetime -> Nullable<Timestamptz>,
        block_number -> Int8,
        from_address -> Nullable<Text>,
        to_address -> Nullable<Text>,
        value_eth -> Numeric,
        gas_price_gwei -> Numeric,
        gas_used -> Int8,
        nonce -> Int8,
        is_error -> Nullable<Bool>,
        tx_status -> Nullable<Bool>,
        method_id -> Nullable<Text>,
        function_name -> Nullable<Text>,
        wallet -> Nullable<Text>,
        blockchain -> Text,
        api_extracted_start_date -> Date,
        api_extracted_end_date -> Date,
        source_file -> Text,
        loaded_at -> Timestamptz,
    }
}

diesel::table! {
    raw.linea_transactions (hash) {
        hash -> Text,
        datetime -> Nullable<Timestamptz>,
        block_number -> Int8,
        from_address -> Nullable<Text>,
        to_address -> Nullable<Text>,
        value_eth -> Numeric,
        gas_price_gwei -> Numeric,
        gas_used -> Int8,
        nonce -> Int8,
        is_error -> Nullable<Bool>,
        tx_status -> Nullable<Bool>,
        method_id -> Nullable<Text>,
        function_name -> Nullable<Text>,
        wallet -> Nullable<Text>,
        blockchain -> Text,
        api_extracted_start_date -> Date,
        api_extracted_end_date -> Date,
        source_file -> Text,
        loaded_at -> Timestamptz,
    }
}
