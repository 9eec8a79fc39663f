use rstheory::{row, ClassRegistry, RawRow, RowMetadata, TestData, TypedTestData};
use std::sync::OnceLock;

// ============================================================================
// Registries
// ============================================================================

fn calc_registry() -> ClassRegistry {
    let mut b = ClassRegistry::builder();
    b.add_interface("ISamples")
        .static_property("Squares", || vec![row![2, 4], row![3, 9], row![-4, 16]])
        .done()
        .unwrap();
    b.add_class("CalcBase")
        .static_method("Zeros", || vec![row![0, 0, 0]])
        .done()
        .unwrap();
    b.add_class("Calc")
        .extends("CalcBase")
        .implements("ISamples")
        .static_method("Sums", || {
            TypedTestData::<(i64, i64, i64)>::from_iter([(1, 2, 3), (-4, -6, -10)])
        })
        .static_method("Gen", |factor: i64| {
            [(1, 2, 3), (-4, -6, -10)]
                .iter()
                .map(|&(a, b, c): &(i64, i64, i64)| row![a * factor, b * factor, c * factor])
                .collect::<Vec<RawRow>>()
        })
        .static_method("Words", || {
            let mut data = TestData::new();
            data.add(row!["theory", 6]).add_row(
                rstheory::DataRow::new(row!["", 0]).with_metadata(RowMetadata::new().label("empty")),
            );
            data
        })
        .done()
        .unwrap();
    b.build()
}

fn shared_registry() -> &'static ClassRegistry {
    static REGISTRY: OnceLock<ClassRegistry> = OnceLock::new();
    REGISTRY.get_or_init(calc_registry)
}

// ============================================================================
// Inline and member data
// ============================================================================

rstheory::theories! {
    class "Calc" in calc_registry() {
        theory "adds" (a: i64, b: i64, expected: i64)
            inline_data(2, 2, 4)
            member_data("Sums")
            member_data("Gen", 0)
            member_data("Gen", 2)
            member_data("Zeros")
        {
            assert_eq!(a + b, expected);
        }

        theory "squares from an interface property" (n: i64, square: i64)
            member_data("Squares")
        {
            assert_eq!(n * n, square);
        }

        theory "word lengths" (word: String, len: i64)
            member_data("Words")
        {
            assert_eq!(word.len() as i64, len);
        }

        theory "nullable inline values" (value: Option<i64>)
            inline_data(None::<i64>)
            inline_data(Some(5))
        {
            assert!(value.map_or(true, |v| v == 5));
        }

        test "plain test runs once" {
            assert_eq!(1 + 1, 2);
        }

        xtheory "ignored theory" (_a: i64)
            inline_data(1)
        {
            panic!("ignored theories do not run");
        }
    }
}

// ============================================================================
// Registry by reference
// ============================================================================

mod shared {
    use super::*;

    rstheory::theories! {
        class "Calc" in shared_registry() {
            theory "shared registry" (a: i64, b: i64, expected: i64)
                member_data("Gen", 3)
            {
                assert_eq!(a + b, expected);
            }
        }
    }
}

// ============================================================================
// Runner output
// ============================================================================

#[test]
fn failing_rows_are_all_reported() {
    let registry = calc_registry();
    let method = rstheory::TestMethod::new("Broken")
        .member_data("Sums", vec![])
        .member_data("Zeros", vec![]);
    let cases = rstheory::Discoverer::new()
        .expand(registry.class("Calc").unwrap(), &method, vec!["Broken"])
        .unwrap();

    let report = rstheory::run_cases("Calc::Broken", &cases, |case| {
        let (a, b, expected): (i64, i64, i64) = case.bind().unwrap();
        assert_ne!(a + b, expected);
    });
    assert_eq!(report.failed, 3);
    assert_eq!(report.failures.len(), 3);
    assert!(report.failures[0].starts_with("Broken(1, 2, 3)"));
}
