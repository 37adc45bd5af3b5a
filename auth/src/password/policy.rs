use argon2::Params;

use super::errors::PasswordError;

/// Argon2id work factor applied to every new password hash.
///
/// The values are embedded in each PHC record, so verification of records
/// produced under an older policy keeps working after the policy changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Memory cost in KiB (`m`)
    pub memory_cost_kib: u32,
    /// Number of passes (`t`)
    pub time_cost: u32,
    /// Degree of parallelism (`p`)
    pub parallelism: u32,
}

impl PasswordPolicy {
    /// Create a policy from explicit Argon2 parameters.
    ///
    /// # Errors
    /// * `InvalidPolicy` - Parameters are outside the ranges Argon2 accepts
    pub fn new(memory_cost_kib: u32, time_cost: u32, parallelism: u32) -> Result<Self, PasswordError> {
        let policy = Self {
            memory_cost_kib,
            time_cost,
            parallelism,
        };
        policy.params()?;
        Ok(policy)
    }

    pub(crate) fn params(&self) -> Result<Params, PasswordError> {
        Params::new(self.memory_cost_kib, self.time_cost, self.parallelism, None)
            .map_err(|e| PasswordError::InvalidPolicy(e.to_string()))
    }

    pub(crate) fn matches(&self, params: &Params) -> bool {
        params.m_cost() == self.memory_cost_kib
            && params.t_cost() == self.time_cost
            && params.p_cost() == self.parallelism
    }
}

impl Default for PasswordPolicy {
    /// OWASP baseline for Argon2id: 19 MiB, 2 passes, 1 lane.
    fn default() -> Self {
        Self {
            memory_cost_kib: Params::DEFAULT_M_COST,
            time_cost: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}
