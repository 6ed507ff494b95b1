use anyhow::Result;
use std::sync::Arc;
use upkick::domain::{Image, KickPolicy};
use upkick::services::{
    Disposition, FailedStep, ImageRefresher, KickContext, Metrics, OutcomeTally, Reconciler,
};
use upkick::test_support::MockRuntime;

/// `app:v1` with `dAAA` -> [c1] and `dBBB` -> [c2, c3]
fn scenario() -> (Arc<MockRuntime>, Image) {
    let mock = Arc::new(MockRuntime::new());
    mock.add_container("c1", "app:v1", "dAAA", true);
    mock.add_container("c2", "app:v1", "dBBB", true);
    mock.add_container("c3", "app:v1", "dBBB", true);
    mock.publish_image("app:v1", "dBBB");

    let mut image = Image::new("app:v1");
    image.insert("dAAA", "c1");
    image.insert("dBBB", "c2");
    image.insert("dBBB", "c3");
    (mock, image)
}

fn refresh(ctx: &KickContext, image: &mut Image) -> Result<()> {
    ImageRefresher::new(ctx).refresh(image)
}

#[test]
fn test_stale_container_is_stopped_and_removed() -> Result<()> {
    let (mock, mut image) = scenario();
    let ctx = KickContext::new(mock.clone(), KickPolicy::default());
    refresh(&ctx, &mut image)?;
    assert_eq!(image.current_digest.as_deref(), Some("dBBB"));

    let mut metrics = Metrics::new("node-1");
    let result = Reconciler::new(&ctx).reconcile(&image, &mut metrics)?;

    assert_eq!(
        result.tally,
        OutcomeTally {
            up_to_date: 2,
            updated: 1,
            update_failed: 0,
            not_updated: 0,
        }
    );
    assert_eq!(result.disposition("c1"), Some(Disposition::Removed));
    assert_eq!(result.disposition("c2"), Some(Disposition::UpToDate));

    let commands = mock.get_commands();
    assert!(commands.contains(&"stop:c1:10".to_string()));
    assert!(commands.contains(&"remove:c1".to_string()));
    assert_eq!(mock.count_commands("stop:"), 1);
    assert_eq!(mock.count_commands("remove:"), 1);
    assert!(!mock.container_exists("c1"));
    assert!(mock.container_exists("c2") && mock.container_exists("c3"));

    assert!(metrics.render().contains(
        "upkick_containers{what=\"up_to_date\",image=\"app:v1\"} 2\n\
         upkick_containers{what=\"updated\",image=\"app:v1\"} 1\n\
         upkick_containers{what=\"update_failed\",image=\"app:v1\"} 0\n\
         upkick_containers{what=\"not_updated\",image=\"app:v1\"} 0\n"
    ));

    Ok(())
}

#[test]
fn test_up_to_date_groups_issue_no_runtime_calls() -> Result<()> {
    let mock = Arc::new(MockRuntime::new());
    mock.add_container("c2", "app:v1", "dBBB", true);

    let mut image = Image::new("app:v1");
    image.insert("dBBB", "c2");
    image.current_digest = Some("dBBB".to_string());

    let ctx = KickContext::new(mock.clone(), KickPolicy::default());
    let result = Reconciler::new(&ctx).reconcile(&image, &mut Metrics::new("node-1"))?;

    assert_eq!(result.tally.up_to_date, 1);
    assert!(mock.get_commands().is_empty());

    Ok(())
}

#[test]
fn test_stop_failure_skips_removal() -> Result<()> {
    let (mock, mut image) = scenario();
    mock.add_container("c4", "app:v1", "dAAA", true);
    image.insert("dAAA", "c4");
    mock.set_fail_on_target("stop", "c1");

    let ctx = KickContext::new(mock.clone(), KickPolicy::default());
    refresh(&ctx, &mut image)?;
    let result = Reconciler::new(&ctx).reconcile(&image, &mut Metrics::new("node-1"))?;

    assert_eq!(result.disposition("c1"), Some(Disposition::Failed(FailedStep::Stop)));
    assert!(!mock.get_commands().contains(&"remove:c1".to_string()));
    assert_eq!(result.disposition("c4"), Some(Disposition::Removed));
    assert_eq!(result.tally.update_failed, 1);
    assert_eq!(result.tally.updated, 1);
    assert_eq!(mock.is_running("c1"), Some(true));

    Ok(())
}

#[test]
fn test_remove_failure_is_tallied() -> Result<()> {
    let (mock, mut image) = scenario();
    mock.set_fail_on_target("remove", "c1");

    let ctx = KickContext::new(mock.clone(), KickPolicy::default());
    refresh(&ctx, &mut image)?;
    let result = Reconciler::new(&ctx).reconcile(&image, &mut Metrics::new("node-1"))?;

    assert_eq!(
        result.disposition("c1"),
        Some(Disposition::Failed(FailedStep::Remove))
    );
    assert_eq!(result.tally.update_failed, 1);
    assert_eq!(result.tally.updated, 0);

    Ok(())
}

#[test]
fn test_stopped_container_is_removed_without_stop() -> Result<()> {
    let (mock, mut image) = scenario();
    mock.set_running("c1", false);

    let ctx = KickContext::new(mock.clone(), KickPolicy::default());
    refresh(&ctx, &mut image)?;
    let result = Reconciler::new(&ctx).reconcile(&image, &mut Metrics::new("node-1"))?;

    assert_eq!(result.disposition("c1"), Some(Disposition::Removed));
    assert_eq!(mock.count_commands("stop:"), 0);
    assert_eq!(mock.count_commands("remove:"), 1);

    Ok(())
}

#[test]
fn test_global_warn_only_never_touches_containers() -> Result<()> {
    let (mock, mut image) = scenario();
    mock.add_container("c4", "app:v1", "dOLD", false);
    image.insert("dOLD", "c4");

    let ctx = KickContext::new(mock.clone(), KickPolicy::new(true));
    refresh(&ctx, &mut image)?;
    let result = Reconciler::new(&ctx).reconcile(&image, &mut Metrics::new("node-1"))?;

    assert_eq!(result.tally.not_updated, 2);
    assert_eq!(result.tally.updated, 0);
    assert_eq!(mock.count_commands("stop:"), 0);
    assert_eq!(mock.count_commands("remove:"), 0);

    Ok(())
}

#[test]
fn test_false_override_kicks_under_warn_only() -> Result<()> {
    let (mock, mut image) = scenario();
    mock.add_labeled_container(
        "c1",
        "app:v1",
        "dAAA",
        true,
        &[("io.upkick.warn_only", "false")],
    );

    let ctx = KickContext::new(mock.clone(), KickPolicy::new(true));
    refresh(&ctx, &mut image)?;
    let result = Reconciler::new(&ctx).reconcile(&image, &mut Metrics::new("node-1"))?;

    assert_eq!(result.disposition("c1"), Some(Disposition::Removed));
    assert_eq!(result.tally.updated, 1);
    assert!(!mock.container_exists("c1"));

    Ok(())
}

#[test]
fn test_vanished_container_is_skipped() -> Result<()> {
    let (mock, mut image) = scenario();
    mock.add_container("c4", "app:v1", "dAAA", true);
    image.insert("dAAA", "c4");

    let ctx = KickContext::new(mock.clone(), KickPolicy::default());
    refresh(&ctx, &mut image)?;
    mock.forget_container("c1");

    let result = Reconciler::new(&ctx).reconcile(&image, &mut Metrics::new("node-1"))?;

    assert_eq!(result.disposition("c1"), Some(Disposition::Vanished));
    assert_eq!(result.disposition("c4"), Some(Disposition::Removed));
    assert!(!mock.get_commands().contains(&"stop:c1:10".to_string()));
    assert_eq!(result.tally.updated, 1);
    assert_eq!(result.tally.update_failed, 0);

    Ok(())
}

#[test]
fn test_unrefreshed_image_is_rejected() {
    let (mock, image) = scenario();
    let ctx = KickContext::new(mock.clone(), KickPolicy::default());

    let err = Reconciler::new(&ctx)
        .reconcile(&image, &mut Metrics::new("node-1"))
        .unwrap_err();

    assert!(err.to_string().contains("has not been refreshed"));
    assert!(mock.get_commands().is_empty());
}

#[test]
fn test_refresh_failures_are_wrapped() {
    let (mock, mut image) = scenario();
    mock.set_fail_on("pull");
    let ctx = KickContext::new(mock.clone(), KickPolicy::default());

    let err = refresh(&ctx, &mut image).unwrap_err();
    assert!(err.to_string().contains("failed to pull image app:v1"));
    assert!(image.current_digest.is_none());
    assert_eq!(mock.count_commands("inspect_image:"), 0);

    let (mock, mut image) = scenario();
    mock.set_fail_on("inspect_image");
    let ctx = KickContext::new(mock.clone(), KickPolicy::default());

    let err = refresh(&ctx, &mut image).unwrap_err();
    assert!(err.to_string().contains("failed to inspect image app:v1"));
    assert!(image.current_digest.is_none());
}
