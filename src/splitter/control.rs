use super::SplitError;

/// Largest value that fits the nine digits of ISA13
pub const MAX_CONTROL_NUMBER: u64 = 999_999_999;

/// Job-wide source of control numbers for regenerated envelopes
///
/// One number is drawn per split unit and used at all three envelope levels,
/// so numbers never repeat within a job.
#[derive(Debug, Clone)]
pub struct ControlNumberSequence {
    next: u64,
}

impl ControlNumberSequence {
    pub fn starting_at(seed: u64) -> Self {
        Self { next: seed.max(1) }
    }

    pub fn next_number(&mut self) -> Result<u64, SplitError> {
        if self.next > MAX_CONTROL_NUMBER {
            return Err(SplitError::ControlNumbersExhausted {
                last: self.next - 1,
                max: MAX_CONTROL_NUMBER,
            });
        }
        let number = self.next;
        self.next += 1;
        Ok(number)
    }
}

impl Default for ControlNumberSequence {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_increments() {
        let mut sequence = ControlNumberSequence::starting_at(41);
        assert_eq!(sequence.next_number().unwrap(), 41);
        assert_eq!(sequence.next_number().unwrap(), 42);
        assert_eq!(sequence.next_number().unwrap(), 43);
    }

    #[test]
    fn test_zero_seed_starts_at_one() {
        let mut sequence = ControlNumberSequence::starting_at(0);
        assert_eq!(sequence.next_number().unwrap(), 1);
    }

    #[test]
    fn test_sequence_exhaustion() {
        let mut sequence = ControlNumberSequence::starting_at(MAX_CONTROL_NUMBER);
        assert_eq!(sequence.next_number().unwrap(), MAX_CONTROL_NUMBER);

        let result = sequence.next_number();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("exhausted"));
    }
}
