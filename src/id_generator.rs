use uuid::Uuid;

pub const COMPONENT_ID_PREFIX: &str = "comp_";

/// Fresh id for a component that arrived without one.
pub fn generate_component_id() -> String {
    format!("{}{}", COMPONENT_ID_PREFIX, Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_prefixed_and_distinct() {
        let a = generate_component_id();
        let b = generate_component_id();
        assert!(a.starts_with(COMPONENT_ID_PREFIX));
        assert_ne!(a, b);
    }
}
