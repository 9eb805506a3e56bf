//! End-to-end integration tests for the taskweave workflow.
//!
//! These tests drive full runs from a request to the final report, with
//! scripted generators standing in for the language model.

use std::sync::{Arc, Mutex};

use taskweave_config::AppConfig;
use taskweave_core::event::{EventBus, WorkflowEvent};
use taskweave_core::generator::Generator;
use taskweave_core::state::{Node, RunState};
use taskweave_core::task::{Feedback, FeedbackKind, Task, TaskStatus};
use taskweave_engine::{RunSummary, Workflow, router};
use taskweave_providers::FallbackGenerator;

// ── Mock Generators ──────────────────────────────────────────────────────

/// A generator that answers by prompt kind and records every prompt.
struct ScriptedGenerator {
    respond: Box<dyn Fn(&str, &str) -> String + Send + Sync>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn new(respond: impl Fn(&str, &str) -> String + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn prompts_of(&self, kind: &str) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| prompt_kind(p) == kind)
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn generate(&self, prompt: &str) -> String {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.respond)(prompt_kind(prompt), prompt)
    }
}

fn prompt_kind(prompt: &str) -> &'static str {
    let first = prompt.lines().next().unwrap_or_default().to_lowercase();
    if first.starts_with("break down") {
        "plan"
    } else if first.starts_with("execute") {
        "execute"
    } else if first.starts_with("reflect") {
        "reflect"
    } else {
        "other"
    }
}

/// The task line of an execute or reflect prompt.
fn task_line(prompt: &str) -> &str {
    prompt
        .lines()
        .find_map(|line| line.trim().strip_prefix("Task: "))
        .unwrap_or_default()
}

fn assert_invariants(state: &RunState) {
    assert!(state.outer_iteration <= 5, "outer iterations exceeded ceiling");
    for task in state.subtasks.iter() {
        assert!(task.attempts <= task.max_attempts, "{} over budget", task.id());
    }
    assert!(state.subtasks.is_consistent());
}

// ── Scenario 1: Generator unavailable ────────────────────────────────────

#[tokio::test]
async fn offline_run_uses_default_decomposition() {
    let generator = Arc::new(FallbackGenerator::offline());
    let workflow = Workflow::new(generator);

    let state = workflow.run("Write a market analysis for electric bikes").await;

    let agent_types: Vec<&str> = state.subtasks.iter().map(|t| t.agent_type.as_str()).collect();
    assert_eq!(
        agent_types,
        vec!["research_agent", "analysis_agent", "creative_agent"]
    );
    assert!(state.workflow_complete);
    assert!(state.all_completed());
    for task in state.subtasks.iter() {
        assert!(state.final_result.contains(&task.description));
    }
    assert_eq!(state.outer_iteration, 1);
    assert_eq!(state.inner_iteration, 3);
    assert_invariants(&state);
}

#[tokio::test]
async fn offline_run_from_default_config() {
    let config = AppConfig::default();
    let generator = Arc::new(taskweave_providers::build_from_config(&config));
    assert!(!generator.is_available());

    let workflow = Workflow::from_config(generator, &config);
    let state = workflow.run("Plan a birthday party").await;

    let summary = RunSummary::from_state(&state, false);
    assert!(summary.stats.succeeded);
    assert_eq!(summary.stats.total, 3);
}

// ── Scenario 2: Retry exhaustion ─────────────────────────────────────────

#[tokio::test]
async fn task_failing_three_times_is_deleted() {
    let generator = Arc::new(ScriptedGenerator::new(|kind, prompt| match kind {
        "plan" => r#"[
            {"description": "Find the data", "agent_type": "research_agent"},
            {"description": "Run the broken model", "agent_type": "technical_agent"},
            {"description": "Write it up", "agent_type": "creative_agent"}
        ]"#
        .to_string(),
        "execute" if task_line(prompt).starts_with("Run the broken model") => String::new(),
        "execute" => format!("Done: {}", task_line(prompt)),
        _ => "Solid work".to_string(),
    }));
    let workflow = Workflow::new(generator.clone());

    let state = workflow.run("Forecast sales").await;

    assert!(state.workflow_complete);
    assert!(!state.subtasks.contains("task_2"));
    let ids: Vec<&str> = state.subtasks.ids().collect();
    assert_eq!(ids, vec!["task_1", "task_3"]);
    assert!(!state.final_result.contains("Run the broken model"));
    assert!(state.final_result.contains("Find the data"));
    assert!(state.final_result.contains("Write it up"));

    // Three executions of the broken task, all immediate retries
    let broken_runs = generator
        .prompts_of("execute")
        .iter()
        .filter(|p| task_line(p).starts_with("Run the broken model"))
        .count();
    assert_eq!(broken_runs, 3);
    assert_invariants(&state);
}

// ── Scenario 3: Continuation cue ─────────────────────────────────────────

#[tokio::test]
async fn additional_cue_queues_one_follow_up() {
    let generator = Arc::new(ScriptedGenerator::new(|kind, prompt| match kind {
        "plan" => r#"[{"description": "Outline chapter one"},
                      {"description": "Draft chapter two"}]"#
            .to_string(),
        "execute" => format!("Result for {}", task_line(prompt)),
        "reflect" if task_line(prompt) == "Outline chapter one" => {
            "Decent, but additional detail is needed".to_string()
        }
        _ => "Good".to_string(),
    }));
    let bus = Arc::new(EventBus::new(512));
    let mut rx = bus.subscribe();
    let workflow = Workflow::new(generator).with_event_bus(bus);

    let state = workflow.run("Write a novella").await;

    let mut queued: Vec<(String, FeedbackKind)> = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let WorkflowEvent::FeedbackQueued { task_id, kind, .. } = event.as_ref() {
            queued.push((task_id.clone(), *kind));
        }
    }
    assert_eq!(queued, vec![("task_1".to_string(), FeedbackKind::Add)]);

    // Every task completed, so the run finalized with the item still queued
    assert!(state.all_completed());
    assert_eq!(state.feedback_queue.len(), 1);
    let item = &state.feedback_queue[0];
    assert_eq!(item.new_tasks, vec!["Follow-up for Outline chapter one"]);

    let summary = RunSummary::from_state(&state, false);
    assert_eq!(summary.pending_feedback.len(), 1);
    assert!(summary.stats.succeeded);
    assert_invariants(&state);
}

#[tokio::test]
async fn follow_up_is_planned_when_a_replan_happens() {
    let generator = Arc::new(ScriptedGenerator::new(|kind, prompt| match kind {
        "plan" => r#"[{"description": "Survey users"},
                      {"description": "Query the dead database"}]"#
            .to_string(),
        "execute" if task_line(prompt).starts_with("Query the dead database") => String::new(),
        "execute" => format!("Result for {}", task_line(prompt)),
        "reflect" if task_line(prompt) == "Survey users" => "Needs more interviews".to_string(),
        _ => "Fine".to_string(),
    }));
    let workflow = Workflow::new(generator);

    let state = workflow.run("Improve onboarding").await;

    // The failing task forces a re-plan, which applies the queued add
    assert_eq!(state.outer_iteration, 2);
    assert!(state.all_completed());
    let descriptions: Vec<&str> = state.subtasks.iter().map(|t| t.description.as_str()).collect();
    assert_eq!(descriptions, vec!["Survey users", "Follow-up for Survey users"]);
    let follow_up = state.subtasks.iter().nth(1).unwrap();
    assert_eq!(follow_up.agent_type, "research_agent");
    assert_eq!(follow_up.result, "Result for Follow-up for Survey users");
    assert!(state.feedback_queue.is_empty());
    assert_invariants(&state);
}

// ── Scenario 4: Deleting the last pending task ───────────────────────────

#[tokio::test]
async fn deleting_last_pending_task_routes_to_finalizer() {
    let generator = Arc::new(ScriptedGenerator::new(|_, _| "unused".to_string()));
    let workflow = Workflow::new(generator.clone());

    let mut state = RunState::new("Two-part job");
    for (id, status) in [("task_1", TaskStatus::Completed), ("task_2", TaskStatus::Pending)] {
        let mut task = Task::new(id, format!("Part {id}"), "research_agent");
        task.status = status;
        task.result = "done".into();
        state.subtasks.insert(task).unwrap();
    }
    state.outer_iteration = 1;
    state
        .feedback_queue
        .push_back(Feedback::delete("task_2", "no longer needed"));

    let next = workflow.step(Node::Plan, &mut state).await;

    assert_eq!(next, Node::Finalize);
    assert_eq!(router::after_plan(&state), Node::Finalize);
    assert!(state.feedback_queue.is_empty());
    assert_eq!(generator.calls(), 0);

    let state = workflow.resume(state, next).await;
    assert_eq!(state.final_result, "✅ Part task_1\n   → done");
}

// ── Properties ───────────────────────────────────────────────────────────

#[tokio::test]
async fn reopened_earlier_task_is_selected_first() {
    // task_1 fails once and recovers on the immediate retry, but its queued
    // modify still re-opens it once task_3 exhausts its attempts and forces
    // a re-plan. By then task_2 is completed; task_1 must still come first.
    let flaky_runs = Arc::new(Mutex::new(0usize));
    let counter = flaky_runs.clone();
    let generator = Arc::new(ScriptedGenerator::new(move |kind, prompt| match kind {
        "plan" => {
            r#"[{"description": "Flaky"}, {"description": "Steady"}, {"description": "Doomed"}]"#
                .to_string()
        }
        "execute" if task_line(prompt).starts_with("Flaky") => {
            let mut n = counter.lock().unwrap();
            *n += 1;
            if *n == 1 { String::new() } else { "recovered".to_string() }
        }
        "execute" if task_line(prompt).starts_with("Doomed") => String::new(),
        "execute" => "ok".to_string(),
        _ => "fine".to_string(),
    }));
    let bus = Arc::new(EventBus::new(512));
    let mut rx = bus.subscribe();
    let workflow = Workflow::new(generator).with_event_bus(bus);

    let state = workflow.run("Order check").await;

    let mut selected = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let WorkflowEvent::TaskSelected { task_id, .. } = event.as_ref() {
            selected.push(task_id.clone());
        }
    }
    assert_eq!(selected, vec!["task_1", "task_2", "task_3", "task_1"]);
    assert_eq!(*flaky_runs.lock().unwrap(), 3);
    assert!(state.all_completed());
    assert!(!state.subtasks.contains("task_3"));
    let flaky = state.subtasks.get("task_1").unwrap();
    assert_eq!(flaky.description, "Flaky (Updated: retry with enhancement)");
    assert_eq!(flaky.attempts, 1);
    assert_invariants(&state);
}

#[tokio::test]
async fn failed_generation_never_completes_a_task() {
    let generator = Arc::new(ScriptedGenerator::new(|kind, _| match kind {
        "plan" => r#"[{"description": "Hopeless"}]"#.to_string(),
        "execute" => "  ".to_string(),
        _ => "more please".to_string(),
    }));
    let workflow = Workflow::new(generator);

    let state = workflow.run("Nothing works").await;

    assert!(state.workflow_complete);
    assert!(state.stopped_early());
    assert_eq!(state.outer_iteration, 5);
    assert!(state.feedback_queue.is_empty());
    for task in state.subtasks.iter() {
        assert_ne!(task.status, TaskStatus::Completed);
        assert!(task.result.starts_with("Executed using"));
    }
    assert_eq!(state.final_result, "No tasks completed successfully");
    assert_invariants(&state);
}

#[tokio::test]
async fn finalizing_twice_gives_the_same_report() {
    let workflow = Workflow::new(Arc::new(FallbackGenerator::offline()));
    let mut state = workflow.run("Idempotence").await;
    let first = state.final_result.clone();

    let next = workflow.step(Node::Finalize, &mut state).await;

    assert_eq!(next, Node::Done);
    assert_eq!(state.final_result, first);
}

#[tokio::test]
async fn summary_json_matches_record_shapes() {
    let workflow = Workflow::new(Arc::new(FallbackGenerator::offline()));
    let state = workflow.run("Shape check").await;

    let json = serde_json::to_value(RunSummary::from_state(&state, true)).unwrap();

    let task = &json["tasks"][0];
    for field in [
        "id",
        "description",
        "status",
        "result",
        "agent_type",
        "tools",
        "attempts",
        "max_attempts",
    ] {
        assert!(task.get(field).is_some(), "missing {field}");
    }
    assert_eq!(task["status"], "completed");
    assert_eq!(task["tools"][0], "web_search");
    assert_eq!(json["workflow_complete"], true);
}
