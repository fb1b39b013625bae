mod common;

#[cfg(test)]
mod tests {
    use crate::common::{User, user};
    use tabula_core::{ColumnMapping, Entity, Value, mapping, to_mapping};

    #[test]
    fn mapping_keys() {
        let mut mapping = ColumnMapping::new();
        assert!(mapping.is_empty());
        assert_eq!(mapping.insert("name", "Ann"), None);
        assert_eq!(mapping.insert("age", 30), None);
        assert_eq!(mapping.insert("city", "Turin"), None);
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.keys().collect::<Vec<_>>(), ["name", "age", "city"]);
        assert_eq!(mapping.sorted_keys(), ["age", "city", "name"]);
        assert_eq!(
            mapping.sorted_entries(),
            [
                ("age", &Value::Int32(Some(30))),
                ("city", &Value::Varchar(Some("Turin".into()))),
                ("name", &Value::Varchar(Some("Ann".into()))),
            ]
        );
    }

    #[test]
    fn mapping_replace() {
        let mut mapping = mapping! { "age" => 30 };
        assert_eq!(mapping.insert("age", 31), Some(Value::Int32(Some(30))));
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get("age"), Some(&Value::Int32(Some(31))));
        assert!(mapping.contains("age"));
        assert_eq!(mapping.remove("age"), Some(Value::Int32(Some(31))));
        assert!(!mapping.contains("age"));
        assert_eq!(mapping.remove("age"), None);
    }

    #[test]
    fn mapping_byte_order() {
        let mapping: ColumnMapping = [("b", 1), ("B", 2), ("a_b", 3), ("ab", 4)]
            .into_iter()
            .collect();
        assert_eq!(mapping.sorted_keys(), ["B", "a_b", "ab", "b"]);
    }

    #[test]
    fn mapping_display() {
        assert_eq!(mapping!().to_string(), "{}");
        let filter = mapping! { "name" => "Ann", "age" => 30 };
        assert_eq!(filter.to_string(), "{age: 30, name: 'Ann'}");
    }

    #[test]
    fn mapping_of_entity() {
        let mut entity = user("Ann", 30);
        entity.id = 4;
        entity.session = Some("transient".into());
        let mapping = entity.to_mapping();
        assert_eq!(mapping.keys().collect::<Vec<_>>(), ["id", "name", "age"]);
        assert_eq!(mapping.get("id"), Some(&Value::Int64(Some(4))));
        assert!(!mapping.contains("session"));
        let mapping = mapping.without_identity();
        assert_eq!(mapping.sorted_keys(), ["age", "name"]);
        assert_eq!(User::columns().iter().filter(|c| c.identity).count(), 1);
    }

    fn persistent_columns<E: Entity>(entity: &E) -> Vec<String> {
        to_mapping(entity)
            .without_identity()
            .sorted_keys()
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn mapping_through_generic_entity() {
        let entity = user("Ann", 30);
        assert_eq!(persistent_columns(&entity), ["age", "name"]);
        assert_eq!(
            to_mapping(&entity).to_string(),
            entity.to_mapping().to_string()
        );
    }
}
