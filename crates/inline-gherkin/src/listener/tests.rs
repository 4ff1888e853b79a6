//! Unit tests for the listener bus and report listeners.

use std::sync::Mutex;

use inline_gherkin_table::{HeaderOverrides, parse_step};
use rstest::{fixture, rstest};

use super::*;
use crate::error::StepError;

#[derive(Default)]
struct Recorder {
    label: &'static str,
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn push(&self, event: String) {
        if let Ok(mut events) = self.events.lock() {
            events.push(format!("{}:{event}", self.label));
        }
    }
}

impl Listener for Recorder {
    fn story_started(&self, event: &StoryEvent<'_>) {
        self.push(format!("story_started {}", event.story.name()));
    }

    fn narrative(&self, _event: &StoryEvent<'_>, narrative: &Narrative) {
        self.push(format!("narrative {}", narrative.as_a));
    }

    fn step_failed(&self, event: &StepEvent<'_>, _failure: &StepFailure) {
        self.push(format!("step_failed {}", event.description));
    }

    fn story_finished(&self, event: &StoryEvent<'_>) {
        self.push(format!("story_finished {}", event.story.name()));
    }
}

#[fixture]
fn story() -> StoryId {
    StoryId::new("LoginStory", "app/LoginStory")
}

fn failure(step: &str) -> StepFailure {
    StepFailure::new(
        StepKeyword::Then,
        step,
        1,
        StepError::Panic {
            message: "expected 3, got 2".into(),
        },
    )
}

#[rstest]
fn bus_delivers_events_in_registration_order(story: StoryId) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let mut bus = ListenerBus::new();
    for label in ["first", "second"] {
        bus.register(Arc::new(Recorder {
            label,
            events: Arc::clone(&events),
        }));
    }
    let narrative = Narrative::new("to stay safe", "user", "log in");
    let event = StoryEvent { story: &story };

    bus.story_started(&event, Some(&narrative));
    bus.story_finished(&event);

    let Ok(events) = events.lock() else {
        panic!("recorder lock poisoned");
    };
    assert_eq!(
        *events,
        [
            "first:story_started LoginStory",
            "second:story_started LoginStory",
            "first:narrative user",
            "second:narrative user",
            "first:story_finished LoginStory",
            "second:story_finished LoginStory",
        ]
    );
}

#[rstest]
fn bus_without_narrative_skips_the_narrative_event(story: StoryId) {
    let recorder = Arc::new(Recorder::default());
    let events = Arc::clone(&recorder.events);
    let mut bus = ListenerBus::new();
    bus.register(recorder);

    bus.story_started(&StoryEvent { story: &story }, None);

    let Ok(events) = events.lock() else {
        panic!("recorder lock poisoned");
    };
    assert_eq!(*events, [":story_started LoginStory"]);
}

#[rstest]
fn flush_without_file_listeners_is_a_no_op() {
    let mut bus = ListenerBus::new();
    bus.register(Arc::new(LogListener::new()));
    bus.register(Arc::new(Recorder::default()));
    assert_eq!(bus.len(), 2);
    assert!(bus.flush(Utf8Path::new("/nonexistent/reports")).is_ok());
}

#[rstest]
fn flush_with_nothing_finished_writes_nothing() {
    let Ok(dir) = tempfile::tempdir() else {
        panic!("failed to create temp dir");
    };
    let Some(base) = Utf8Path::from_path(dir.path()) else {
        panic!("temp dir is not UTF-8");
    };
    let mut bus = ListenerBus::new();
    bus.register(Arc::new(XmlListener::new()));
    assert!(bus.flush(base).is_ok());
    let entries = std::fs::read_dir(base).map(Iterator::count).unwrap_or(usize::MAX);
    assert_eq!(entries, 0);
}

fn step_event<'a>(story: &'a StoryId, keyword: StepKeyword, description: &'a str) -> StepEvent<'a> {
    StepEvent {
        story,
        scenario: "admin logs in",
        keyword,
        description,
        table: None,
    }
}

fn drive_sample_story(listener: &dyn Listener, story: &StoryId) {
    let Ok(parsed) = parse_step(
        "the users: |name|role||alice|admin|",
        &HeaderOverrides::new(),
    ) else {
        panic!("sample table must parse");
    };
    let story_event = StoryEvent { story };
    let scenario = ScenarioEvent {
        story,
        title: "admin logs in",
    };

    listener.story_started(&story_event);
    listener.narrative(&story_event, &Narrative::new("to stay safe", "user", "log in"));
    listener.scenario_started(&scenario);
    listener.step_succeeded(&StepEvent {
        table: parsed.table.as_ref(),
        ..step_event(story, StepKeyword::Given, &parsed.description)
    });
    listener.step_failed(
        &step_event(story, StepKeyword::Then, "access is granted"),
        &failure("access is granted"),
    );
    listener.step_skipped(&step_event(story, StepKeyword::And, "the audit log <grows>"));
    listener.scenario_failed(&scenario, &failure("access is granted"));
    listener.story_finished(&story_event);
}

#[rstest]
fn report_listener_collects_finished_stories(story: StoryId) {
    let listener = XmlListener::new();
    drive_sample_story(&listener, &story);

    let finished = listener.take_finished();
    let [report] = finished.as_slice() else {
        panic!("expected one finished story, got {}", finished.len());
    };
    assert_eq!(report.id(), &story);
    let [scenario] = report.scenarios() else {
        panic!("expected one scenario");
    };
    let states: Vec<_> = scenario.steps().iter().map(StepReport::state).collect();
    assert_eq!(states, [StepState::Success, StepState::Failed, StepState::Skipped]);
    assert!(scenario.failure().is_some_and(|text| text.contains("expected 3, got 2")));
    assert!(listener.take_finished().is_empty());
}

#[rstest]
fn xml_report_renders_story(story: StoryId) {
    let listener = XmlListener::new();
    drive_sample_story(&listener, &story);
    let finished = listener.take_finished();
    let [report] = finished.as_slice() else {
        panic!("expected one finished story");
    };

    let Ok(xml) = XmlFormat.render(report) else {
        panic!("rendering must succeed");
    };
    let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<story name="LoginStory" path="app/LoginStory">
    <inOrderTo>to stay safe</inOrderTo>
    <iWantTo>log in</iWantTo>
    <asA>user</asA>
    <scenario title="admin logs in">
        <step name="the users:" type="Given" state="success">
            <table>
                <row>
                    <entry name="name">alice</entry>
                    <entry name="role">admin</entry>
                </row>
            </table>
        </step>
        <step name="access is granted" type="Then" state="failed">
            <failure>step failed: access is granted
caused by: step panicked: expected 3, got 2</failure>
        </step>
        <step name="the audit log &lt;grows&gt;" type="And" state="skipped" />
        <failure>step failed: access is granted
caused by: step panicked: expected 3, got 2</failure>
    </scenario>
</story>
"#;
    assert_eq!(xml, expected);
}

#[cfg(feature = "diagnostics")]
#[rstest]
fn json_report_uses_lowercase_states(story: StoryId) {
    let listener = JsonListener::new();
    drive_sample_story(&listener, &story);
    let finished = listener.take_finished();
    let [report] = finished.as_slice() else {
        panic!("expected one finished story");
    };

    let Ok(text) = JsonFormat.render(report) else {
        panic!("rendering must succeed");
    };
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) else {
        panic!("report must be valid JSON");
    };
    let field = |pointer: &str| value.pointer(pointer).and_then(serde_json::Value::as_str);
    assert_eq!(field("/name"), Some("LoginStory"));
    assert_eq!(field("/narrative/as_a"), Some("user"));
    assert_eq!(field("/scenarios/0/steps/0/state"), Some("success"));
    assert_eq!(field("/scenarios/0/steps/0/table/headers/1"), Some("role"));
    assert_eq!(field("/scenarios/0/steps/0/table/rows/0/0"), Some("alice"));
    assert_eq!(field("/scenarios/0/steps/1/state"), Some("failed"));
    assert_eq!(field("/scenarios/0/steps/2/state"), Some("skipped"));
    assert_eq!(field("/scenarios/0/steps/2/type"), Some("And"));
}
