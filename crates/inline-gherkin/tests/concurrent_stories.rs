//! Stories running on separate threads through one shared runner.

use std::fs;
use std::thread;

use camino::Utf8PathBuf;
use inline_gherkin::{FailureMode, RunnerConfig, StepRunner, StoryId};

const STORIES: [&str; 4] = ["AlphaStory", "BetaStory", "GammaStory", "DeltaStory"];
const SCENARIOS: usize = 10;

fn run_story(runner: &StepRunner, name: &str) {
    let mut story = runner.start_story(StoryId::new(name, format!("threads/{name}")), None);
    for index in 0..SCENARIOS {
        let title = format!("{name} scenario {index}");
        let result = runner.scenario(&mut story, &title, |s| {
            s.given(&format!("{name} given {index}"), || Ok(()))?;
            s.when(&format!("{name} when {index}"), || {
                thread::yield_now();
                Ok(())
            })?;
            s.then(&format!("{name} then {index}"), || {
                if index % 3 == 0 {
                    Err(format!("{name} failure {index}").into())
                } else {
                    Ok(())
                }
            })?;
            Ok(())
        });
        assert_eq!(result.is_err(), index % 3 == 0);
    }
    assert!(runner.end_story(story).is_ok());
}

#[test]
fn each_story_report_holds_only_its_own_scenarios() {
    let Ok(dir) = tempfile::tempdir() else {
        panic!("failed to create temp dir");
    };
    let base = Utf8PathBuf::from(dir.path().to_string_lossy().into_owned());
    let config = RunnerConfig::default()
        .with_base_dir(base.clone())
        .with_failure_mode(FailureMode::CatchCompleteOutput);
    let Ok(runner) = StepRunner::new(config) else {
        panic!("runner must build");
    };

    thread::scope(|scope| {
        for name in STORIES {
            let runner = &runner;
            scope.spawn(move || run_story(runner, name));
        }
    });

    for name in STORIES {
        let report = base.join(format!("{name}.xml"));
        let Ok(xml) = fs::read_to_string(&report) else {
            panic!("report {report} must exist");
        };
        assert!(xml.contains(&format!("<story name=\"{name}\" path=\"threads/{name}\">")));
        assert_eq!(xml.matches("<scenario ").count(), SCENARIOS);
        assert_eq!(xml.matches(&format!("\"{name} given ")).count(), SCENARIOS);
        assert_eq!(xml.matches("state=\"failed\"").count(), 4);
        for other in STORIES.iter().filter(|other| **other != name) {
            assert!(!xml.contains(other), "{name}.xml mentions {other}");
        }
    }
}
