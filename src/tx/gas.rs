//! Gas ceiling enforcement

use crate::error::{PipelineError, PipelineResult, UsageError};

use ethers::types::U256;

/// Upper bound on the gas a submission may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasCeiling {
    max_gas: U256,
}

impl GasCeiling {
    /// Create a ceiling; zero is rejected
    pub fn new(max_gas: u64) -> PipelineResult<Self> {
        if max_gas == 0 {
            return Err(UsageError::ZeroGasCeiling.into());
        }
        Ok(Self {
            max_gas: U256::from(max_gas),
        })
    }

    pub fn max_gas(&self) -> U256 {
        self.max_gas
    }

    /// Accept an estimate that fits under the ceiling
    pub fn check(&self, estimated: U256) -> PipelineResult<U256> {
        if estimated > self.max_gas {
            return Err(PipelineError::GasCeilingExceeded {
                estimated,
                ceiling: self.max_gas,
            });
        }
        Ok(estimated)
    }

    /// Calculate the maximum fee in wei
    pub fn calculate_cost(gas_limit: U256, gas_price: U256) -> U256 {
        gas_limit.saturating_mul(gas_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_ceiling_is_usage_error() {
        assert!(matches!(
            GasCeiling::new(0),
            Err(PipelineError::Usage(UsageError::ZeroGasCeiling))
        ));
    }

    #[test]
    fn test_estimate_at_ceiling_passes() {
        let ceiling = GasCeiling::new(100_000).unwrap();
        assert_eq!(ceiling.check(U256::from(21_000)).unwrap(), U256::from(21_000));
        assert_eq!(ceiling.check(U256::from(100_000)).unwrap(), U256::from(100_000));
    }

    #[test]
    fn test_estimate_above_ceiling_fails() {
        let ceiling = GasCeiling::new(100_000).unwrap();
        let err = ceiling.check(U256::from(200_000)).unwrap_err();
        match err {
            PipelineError::GasCeilingExceeded { estimated, ceiling } => {
                assert_eq!(estimated, U256::from(200_000));
                assert_eq!(ceiling, U256::from(100_000));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_calculate_cost() {
        let cost = GasCeiling::calculate_cost(U256::from(21_000), U256::from(2_000_000_000u64));
        assert_eq!(cost, U256::from(42_000_000_000_000u64));
    }
}
