use std::{sync::Arc, time::Duration};

use anyhow::Result;
use entity::{Employee, EmployeeFilter, NewEmployee};
use products_hr::{ImportOutcome, MemoryNotifier, Roster, Severity, reconcile};
use suite_tests::{Call, ScriptedApi};

fn new_employee(name: &str, department: &str, salary: i64) -> NewEmployee {
    NewEmployee {
        name: name.into(),
        department: department.into(),
        salary,
    }
}

#[tokio::test]
async fn template_upload_creates_both_rows() -> Result<()> {
    let api = ScriptedApi::new();
    let text = "ID,Name,Department,Salary\n,John Doe,IT,600000\n,Jane Smith,HR,550000";
    let outcome = reconcile(&api, text).await?;
    assert_eq!(
        api.calls(),
        vec![
            Call::Create(new_employee("John Doe", "IT", 600_000)),
            Call::Create(new_employee("Jane Smith", "HR", 550_000)),
        ]
    );
    assert_eq!(outcome.success_count, 2);
    assert_eq!(outcome.fail_count, 0);
    Ok(())
}

#[tokio::test]
async fn id_column_selects_update_or_create() -> Result<()> {
    let api = ScriptedApi::new();
    reconcile(&api, "7,Asha,HR,10\n,Ravi,IT,20\n 7 ,Asha,HR,30").await?;
    assert_eq!(
        api.calls(),
        vec![
            Call::Update(new_employee("Asha", "HR", 10).with_id(7)),
            Call::Create(new_employee("Ravi", "IT", 20)),
            // Same id twice means two updates; nothing is de-duplicated.
            Call::Update(new_employee("Asha", "HR", 30).with_id(7)),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn two_column_rows_touch_neither_count() -> Result<()> {
    let api = ScriptedApi::new();
    let outcome = reconcile(&api, "Asha,HR,10\nonly,two\nRavi,IT,20").await?;
    assert_eq!(api.calls().len(), 2);
    assert_eq!(
        outcome,
        ImportOutcome {
            success_count: 2,
            fail_count: 0,
            skipped: 1,
        }
    );
    Ok(())
}

#[tokio::test]
async fn one_failure_among_many_is_counted_and_skipped_past() -> Result<()> {
    let api = ScriptedApi::new().failing_name("Ravi");
    let outcome = reconcile(&api, "Asha,HR,10\nRavi,IT,20\n3,Mira,Ops,30\nDev,QA,40").await?;
    assert_eq!(api.calls().len(), 4);
    assert_eq!(outcome.success_count, 3);
    assert_eq!(outcome.fail_count, 1);
    Ok(())
}

#[tokio::test]
async fn dispatch_is_sequential_in_row_order() -> Result<()> {
    let api = ScriptedApi::new().with_latency(Duration::from_millis(5));
    let text = (0..6)
        .map(|i| format!("emp{i},D,{i}"))
        .collect::<Vec<_>>()
        .join("\n");
    reconcile(&api, &text).await?;
    assert_eq!(api.max_in_flight(), 1);
    let names: Vec<_> = api
        .calls()
        .into_iter()
        .map(|call| match call {
            Call::Create(e) => e.name,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(names, (0..6).map(|i| format!("emp{i}")).collect::<Vec<_>>());
    Ok(())
}

#[tokio::test]
async fn roster_reloads_after_import_even_when_every_row_fails() -> Result<()> {
    let api = Arc::new(ScriptedApi::new().failing_name("Asha"));
    let notifier = Arc::new(MemoryNotifier::new());
    let mut roster = Roster::new(Arc::clone(&api), notifier.clone());
    let outcome = roster.import_csv("name,department,salary\nAsha,HR,10").await?;
    assert_eq!(outcome.fail_count, 1);
    assert_eq!(
        api.calls().last(),
        Some(&Call::List(EmployeeFilter::default()))
    );
    let notice = notifier.notices().remove(0);
    assert_eq!(notice.severity, Severity::Error);
    assert_eq!(notice.message, "Processed 1 records: 0 successful, 1 failed.");
    Ok(())
}

#[tokio::test]
async fn bulk_delete_runs_concurrently_and_reports_in_aggregate() -> Result<()> {
    let staff: Vec<Employee> = (1..=4)
        .map(|id| new_employee(&format!("emp{id}"), "IT", 1).with_id(id))
        .collect();
    let api = Arc::new(
        ScriptedApi::new()
            .listing(staff)
            .failing_id(2)
            .with_latency(Duration::from_millis(20)),
    );
    let notifier = Arc::new(MemoryNotifier::new());
    let mut roster = Roster::new(Arc::clone(&api), notifier.clone());
    roster.load(&EmployeeFilter::default()).await?;
    roster.select_all(true);

    assert!(roster.delete_selected().await.is_err());
    assert!(api.max_in_flight() > 1);
    let mut deleted: Vec<i64> = api
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::Delete(id) => Some(id),
            _ => None,
        })
        .collect();
    deleted.sort_unstable();
    assert_eq!(deleted, vec![1, 2, 3, 4]);
    let errors: Vec<_> = notifier
        .notices()
        .into_iter()
        .filter(|n| n.severity == Severity::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Delete operation faced issues");
    Ok(())
}
