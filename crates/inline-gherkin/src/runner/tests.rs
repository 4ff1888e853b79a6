//! Unit tests for the step runner.

use camino::Utf8PathBuf;
use inline_gherkin_table::Row;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;
use crate::Fatal;

struct Fixture {
    runner: StepRunner,
    _dir: TempDir,
}

fn runner_with(mode: FailureMode) -> Fixture {
    let Ok(dir) = tempfile::tempdir() else {
        panic!("failed to create temp dir");
    };
    let base_dir = Utf8PathBuf::from(dir.path().to_string_lossy().into_owned());
    let config = RunnerConfig::default()
        .with_base_dir(base_dir)
        .with_failure_mode(mode)
        .with_listeners(Vec::new());
    let Ok(runner) = StepRunner::new(config) else {
        panic!("runner must build");
    };
    Fixture { runner, _dir: dir }
}

#[fixture]
fn fail_fast() -> Fixture {
    runner_with(FailureMode::FailFast)
}

fn story_id() -> StoryId {
    StoryId::new("UnitStory", "runner/UnitStory")
}

#[test]
fn runner_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StepRunner>();
}

#[rstest]
#[case(StepOutcome::Passed { attempts: 1 }, true)]
#[case(StepOutcome::Absorbed { attempts: 2 }, true)]
#[case(StepOutcome::Failed { attempts: 1 }, false)]
#[case(StepOutcome::Skipped, false)]
fn outcome_success_classification(#[case] outcome: StepOutcome, #[case] expected: bool) {
    assert_eq!(outcome.is_success(), expected);
}

#[test]
fn builder_creates_nested_report_directory() {
    let Ok(dir) = tempfile::tempdir() else {
        panic!("failed to create temp dir");
    };
    let nested = Utf8PathBuf::from(dir.path().to_string_lossy().into_owned()).join("a/b");
    let built = StepRunner::new(
        RunnerConfig::default()
            .with_base_dir(nested.clone())
            .with_listeners(Vec::new()),
    );
    assert!(built.is_ok());
    assert!(nested.is_dir());
}

#[rstest]
fn keyword_marker_tracks_every_step(fail_fast: Fixture) {
    let runner = &fail_fast.runner;
    let story = runner.start_story(story_id(), None);
    let mut ctx = runner.start_scenario(&story, "marker");
    let options = StepOptions::default();
    for step_type in [StepType::Given, StepType::Then, StepType::Then] {
        assert!(
            runner
                .execute_step(&mut ctx, step_type, "a step", &options, || Ok(()))
                .is_ok()
        );
    }
    assert_eq!(ctx.last_keyword, Some(StepKeyword::Then));
    assert_eq!(ctx.steps(), 3);
}

#[rstest]
fn malformed_table_fails_before_the_step_counts(fail_fast: Fixture) {
    let runner = &fail_fast.runner;
    let story = runner.start_story(story_id(), None);
    let mut ctx = runner.start_scenario(&story, "broken table");
    let mut ran = false;
    let result = runner.execute_step(
        &mut ctx,
        StepType::Given,
        "numbers: |a|b||1|",
        &StepOptions::default(),
        || {
            ran = true;
            Ok(())
        },
    );
    let Err(failure) = result else {
        panic!("uneven row must fail");
    };
    assert!(!ran);
    assert_eq!(failure.attempts(), 0);
    assert_eq!(failure.step(), "numbers:");
    assert!(matches!(failure.error(), StepError::Parse(_)));
    assert_eq!(ctx.steps(), 0);
    assert!(ctx.has_failed());
}

#[rstest]
fn table_step_without_table_is_rejected(fail_fast: Fixture) {
    let runner = &fail_fast.runner;
    let story = runner.start_story(story_id(), None);
    let mut ctx = runner.start_scenario(&story, "no table");
    let result = runner.execute_table_step(
        &mut ctx,
        StepType::Given,
        "plain text",
        &TableMapper::<Row>::raw(),
        &StepOptions::default(),
        |_| Ok(()),
    );
    let Err(failure) = result else {
        panic!("missing table must fail");
    };
    assert!(matches!(failure.error(), StepError::MissingTable));
    assert_eq!(failure.step(), "plain text");
    assert!(ctx.has_failed());
}

#[rstest]
fn rejected_tables_fail_the_scenario(fail_fast: Fixture) {
    let runner = &fail_fast.runner;
    let mut story = runner.start_story(story_id(), None);
    let mut ctx = runner.start_scenario(&story, "broken table");
    let rejected = runner.execute_step(
        &mut ctx,
        StepType::Given,
        "numbers: |a|b||1|",
        &StepOptions::default(),
        || Ok(()),
    );
    assert!(rejected.is_err());
    let Err(failure) = runner.end_scenario(&mut story, ctx) else {
        panic!("a rejected table must fail the scenario");
    };
    assert!(matches!(failure.error(), StepError::Parse(_)));
    assert_eq!((story.passed(), story.failed()), (0, 1));
}

#[rstest]
fn scenario_returns_the_first_recorded_failure() {
    let fixture = runner_with(FailureMode::CatchCompleteOutput);
    let runner = &fixture.runner;
    let mut story = runner.start_story(story_id(), None);
    let result = runner.scenario(&mut story, "two failures", |s| {
        s.given("it breaks", || Err("first".into()))?;
        s.when_table("rows: |a|b||1|", &TableMapper::<Row>::raw(), |_| Ok(()))?;
        Ok(())
    });
    let Err(failure) = result else {
        panic!("the scenario must fail");
    };
    assert_eq!(failure.step(), "it breaks");
    assert_eq!(failure.error().to_string(), "first");
}

#[rstest]
fn scenario_prefers_fatal_over_recorded_failures() {
    let fixture = runner_with(FailureMode::CatchCompleteOutput);
    let runner = &fixture.runner;
    let mut story = runner.start_story(story_id(), None);
    let result = runner.scenario(&mut story, "fatal after failure", |s| {
        s.given("it breaks", || Err("first".into()))?;
        s.when("it explodes", || Err(Fatal::new("disk on fire").into()))?;
        Ok(())
    });
    let Err(failure) = result else {
        panic!("the scenario must fail");
    };
    assert!(failure.is_fatal());
    assert_eq!(story.failed(), 1);
}

#[rstest]
fn fatal_errors_stop_accumulating_scenarios() {
    let fixture = runner_with(FailureMode::CatchCompleteOutput);
    let runner = &fixture.runner;
    let mut story = runner.start_story(story_id(), None);
    let mut ctx = runner.start_scenario(&story, "fatal");
    let mut calls = 0;
    let options =
        StepOptions::default().eventually(crate::RetryPolicy::default().timeout_ms(200).interval_ms(1));
    let result = runner.execute_step(&mut ctx, StepType::When, "it explodes", &options, || {
        calls += 1;
        Err(Fatal::new("disk on fire").into())
    });
    let Err(failure) = result else {
        panic!("fatal errors always propagate");
    };
    assert!(failure.is_fatal());
    assert_eq!(calls, 1);
    assert!(ctx.has_failed());
    assert!(runner.end_scenario(&mut story, ctx).is_err());
    assert_eq!(story.failed(), 1);
}

#[rstest]
fn scenario_records_body_errors(fail_fast: Fixture) {
    let runner = &fail_fast.runner;
    let mut story = runner.start_story(story_id(), None);
    let result = runner.scenario(&mut story, "parse error in body", |s| {
        s.given("rows: |a||", || Ok(()))?;
        Ok(())
    });
    let Err(failure) = result else {
        panic!("body error must be returned");
    };
    assert!(matches!(failure.error(), StepError::Parse(_)));
    assert_eq!((story.passed(), story.failed()), (0, 1));
}
