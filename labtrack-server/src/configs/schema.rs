use crate::models::{
    EquipmentInspectionTable, EquipmentTable, EquipmentTemperatureLogTable, RoomTable, Table,
    TemperatureLogTable, UserTable,
};

pub struct SchemaManager {
    tables: Vec<Box<dyn Table>>,
}

impl SchemaManager {
    pub fn new(mut tables: Vec<Box<dyn Table>>) -> Self {
        Self::sort_tables(&mut tables);
        Self { tables }
    }

    fn sort_tables(tables: &mut Vec<Box<dyn Table>>) {
        let mut to_sort = std::mem::take(tables);
        let mut deps_list: Vec<_> = to_sort.iter().map(|t| t.dependencies()).collect();
        let mut sorted = Vec::with_capacity(to_sort.len());

        while !to_sort.is_empty() {
            let independent_indices: Vec<usize> = deps_list
                .iter()
                .enumerate()
                .filter(|(_, deps)| deps.is_empty())
                .map(|(i, _)| i)
                .collect();

            assert!(
                !independent_indices.is_empty(),
                "Circular dependency detected or unresolved dependencies exist."
            );

            for &index in independent_indices.iter().rev() {
                let table = to_sort.swap_remove(index);
                let _ = deps_list.swap_remove(index);
                sorted.push(table);
            }

            for deps in deps_list.iter_mut() {
                deps.retain(|dep_name| {
                    !sorted
                        .iter()
                        .any(|resolved_table| resolved_table.name() == *dep_name)
                });
            }
        }

        *tables = sorted;
    }

    pub fn create_schema(&self) -> Vec<String> {
        self.tables.iter().map(|table| table.create()).collect()
    }

    pub fn dispose_schema(&self) -> Vec<String> {
        self.tables.iter().rev().map(|table| table.dispose()).collect()
    }
}

impl Default for SchemaManager {
    fn default() -> Self {
        SchemaManager::new(vec![
            Box::new(UserTable),
            Box::new(RoomTable),
            Box::new(EquipmentTable),
            // Records
            Box::new(TemperatureLogTable),
            Box::new(EquipmentTemperatureLogTable),
            Box::new(EquipmentInspectionTable),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockTable {
        name: &'static str,
        dependencies: Vec<&'static str>,
    }

    impl Table for MockTable {
        fn name(&self) -> &'static str {
            self.name
        }

        fn create(&self) -> String {
            format!("CREATE TABLE {};", self.name)
        }

        fn dispose(&self) -> String {
            format!("DROP TABLE {};", self.name)
        }

        fn dependencies(&self) -> Vec<&'static str> {
            self.dependencies.clone()
        }
    }

    fn table(name: &'static str, dependencies: Vec<&'static str>) -> Box<dyn Table> {
        Box::new(MockTable { name, dependencies })
    }

    #[test]
    fn test_correct_creation_order() {
        let manager = SchemaManager::new(vec![
            table("temperature_logs", vec!["rooms", "users"]),
            table("rooms", vec![]),
            table("users", vec![]),
        ]);
        let statements = manager.create_schema();

        assert_eq!(statements.len(), 3);
        assert_eq!(statements[2], "CREATE TABLE temperature_logs;");
    }

    #[test]
    fn test_dispose_reverses_creation() {
        let manager = SchemaManager::new(vec![
            table("equipment_inspections", vec!["equipment", "users"]),
            table("equipment", vec![]),
            table("users", vec![]),
        ]);
        let statements = manager.dispose_schema();

        assert_eq!(statements[0], "DROP TABLE equipment_inspections;");
    }

    #[test]
    fn test_default_schema_records_follow_assets() {
        let manager = SchemaManager::default();
        let names: Vec<_> = manager.tables.iter().map(|t| t.name()).collect();
        let position = |name: &str| names.iter().position(|n| *n == name).unwrap();

        assert!(position("rooms") < position("temperature_logs"));
        assert!(position("users") < position("temperature_logs"));
        assert!(position("equipment") < position("equipment_temperature_logs"));
        assert!(position("equipment") < position("equipment_inspections"));
    }

    #[test]
    #[should_panic(expected = "Circular dependency")]
    fn test_circular_dependency_panics() {
        SchemaManager::new(vec![table("a", vec!["b"]), table("b", vec!["a"])]);
    }
}
