//! Monotonic port allocation for game server instances
//!
//! One counter, initialized to the configured base, strictly increasing,
//! never reused. Allocation is two-phase (`peek`, then `advance`) so that
//! a failed process launch does not burn a port: N successful creates
//! always yield exactly {base .. base+N-1}.

use crate::error::{BrokerError, Result};

#[derive(Debug)]
pub struct PortAllocator {
    /// Next port to hand out, or None once the u16 range is exhausted
    next: Option<u16>,
}

impl PortAllocator {
    pub fn new(base_port: u16) -> Self {
        Self {
            next: Some(base_port),
        }
    }

    /// The port the next successful CreateLobby will receive
    pub fn peek(&self) -> Result<u16> {
        self.next.ok_or_else(|| BrokerError::PortsExhausted.into())
    }

    /// Consume the peeked port. Called only after the launch succeeded.
    pub fn advance(&mut self) -> Result<u16> {
        let port = self.peek()?;
        self.next = port.checked_add(1);
        Ok(port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ports_are_sequential_from_base() {
        let mut allocator = PortAllocator::new(3001);
        assert_eq!(allocator.advance().unwrap(), 3001);
        assert_eq!(allocator.advance().unwrap(), 3002);
        assert_eq!(allocator.advance().unwrap(), 3003);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut allocator = PortAllocator::new(4000);
        assert_eq!(allocator.peek().unwrap(), 4000);
        assert_eq!(allocator.peek().unwrap(), 4000);
        assert_eq!(allocator.advance().unwrap(), 4000);
        assert_eq!(allocator.peek().unwrap(), 4001);
    }

    #[test]
    fn test_exhaustion_at_end_of_range() {
        let mut allocator = PortAllocator::new(u16::MAX);
        assert_eq!(allocator.advance().unwrap(), u16::MAX);
        assert!(allocator.advance().is_err());
        assert!(allocator.peek().is_err());
    }

    proptest! {
        #[test]
        fn prop_allocations_are_strictly_increasing(base in 1u16..60_000, count in 1usize..64) {
            let mut allocator = PortAllocator::new(base);
            let mut previous = None;
            for i in 0..count {
                let port = allocator.advance().unwrap();
                prop_assert_eq!(port, base + i as u16);
                if let Some(p) = previous {
                    prop_assert!(port > p);
                }
                previous = Some(port);
            }
        }
    }
}
