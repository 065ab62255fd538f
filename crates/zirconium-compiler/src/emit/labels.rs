//! Generated label names for control flow.
//!
//! Generated labels start with `@`, which no script identifier can, so they
//! never collide with function labels.

/// Hands out unique label names.
#[derive(Debug, Default)]
pub struct LabelAllocator {
    next: u32,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh label such as `@then0`.
    pub fn fresh(&mut self, prefix: &str) -> String {
        let name = format!("@{}{}", prefix, self.next);
        self.next += 1;
        name
    }

    /// Number of labels handed out.
    pub fn count(&self) -> u32 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_unique_across_prefixes() {
        let mut labels = LabelAllocator::new();
        assert_eq!(labels.fresh("then"), "@then0");
        assert_eq!(labels.fresh("end"), "@end1");
        assert_eq!(labels.fresh("then"), "@then2");
        assert_eq!(labels.count(), 3);
    }
}
