use bigdecimal::BigDecimal;
use ethabi::ethereum_types::U256;
use num_bigint::{BigInt, Sign};

pub const ETH_DECIMALS: i64 = 18;
pub const GWEI_DECIMALS: i64 = 9;

/// Exact: the wei amount becomes the unscaled value of an 18-scale decimal.
pub fn wei_to_eth(wei: &BigInt) -> BigDecimal {
    BigDecimal::new(wei.clone(), ETH_DECIMALS)
}

pub fn wei_to_gwei(wei: &BigInt) -> BigDecimal {
    BigDecimal::new(wei.clone(), GWEI_DECIMALS)
}

pub fn u256_to_bigint(value: &U256) -> BigInt {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    BigInt::from_bytes_be(Sign::Plus, &bytes)
}
