//! `taskweave run` — Run the workflow on one request.

use std::io::BufRead;
use std::sync::Arc;
use taskweave_config::AppConfig;
use taskweave_core::event::{EventBus, WorkflowEvent};
use taskweave_core::generator::Generator;
use taskweave_core::state::Node;
use taskweave_core::task::{FeedbackKind, TaskStatus};
use taskweave_engine::{RunSummary, Workflow};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::warn;

pub async fn run(
    request: Option<String>,
    json: bool,
    full: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let request = match request {
        Some(request) => request,
        None => read_request()?,
    };
    let request = request.trim().to_string();
    if request.is_empty() {
        return Err("No request provided.".into());
    }

    let generator = Arc::new(taskweave_providers::build_from_config(&config));
    if !json {
        println!("🚀 taskweave");
        println!("{}", "=".repeat(50));
        if generator.is_available() {
            println!("✅ Generator: {} ({})", generator.name(), config.model);
        } else {
            println!("⚠️  No API key configured, using fallback responses");
        }
        println!("\n🎯 Processing: {request}");
        println!("{}", "=".repeat(50));
    }

    let bus = Arc::new(EventBus::default());
    let printer = (!json).then(|| tokio::spawn(print_progress(bus.subscribe())));

    let workflow = Workflow::from_config(generator, &config).with_event_bus(bus.clone());
    let state = workflow.run(request).await;

    // Dropping the bus closes the channel and ends the printer
    drop(workflow);
    drop(bus);
    if let Some(printer) = printer {
        join_printer(printer).await;
    }

    let summary = RunSummary::with_preview(&state, full, config.engine.result_preview_chars);
    if json {
        println!("{}", summary.to_json()?);
    } else {
        print_summary(&summary);
    }

    Ok(())
}

/// One line from stdin.
fn read_request() -> Result<String, Box<dyn std::error::Error>> {
    eprint!("Enter your request: ");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

async fn print_progress(mut rx: broadcast::Receiver<Arc<WorkflowEvent>>) {
    loop {
        match rx.recv().await {
            Ok(event) => print_event(&event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                println!("   … {skipped} progress events skipped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Wait for the printer; a panic there is logged, never propagated.
async fn join_printer(printer: JoinHandle<()>) -> bool {
    match printer.await {
        Ok(()) => true,
        Err(e) => {
            warn!("Progress printer stopped abnormally: {e}");
            false
        }
    }
}

fn print_event(event: &WorkflowEvent) {
    match event {
        WorkflowEvent::TaskSelected { task_id, .. } => println!("🎯 Selected: {task_id}"),
        WorkflowEvent::TaskExecuted {
            task_id,
            status,
            attempt,
            ..
        } => println!("⚙️  Executed {task_id} (attempt {attempt}): {status}"),
        WorkflowEvent::FeedbackQueued {
            task_id,
            kind,
            message,
            ..
        } => println!("💭 Feedback for {task_id} [{kind}]: {message}"),
        WorkflowEvent::FeedbackApplied { task_id, kind, .. } => {
            let verb = match kind {
                FeedbackKind::Modify => "re-opened",
                FeedbackKind::Delete => "removed",
                FeedbackKind::Add => "expanded",
            };
            println!("🔄 {task_id} {verb}");
        }
        WorkflowEvent::NodeEntered {
            node: Node::Plan,
            ..
        } => println!("\n🧠 Planning"),
        WorkflowEvent::NodeEntered {
            node: Node::Finalize,
            ..
        } => println!("\n📋 Finalizing results..."),
        WorkflowEvent::RunStarted { .. }
        | WorkflowEvent::NodeEntered { .. }
        | WorkflowEvent::RunFinished { .. } => {}
    }
}

fn status_marker(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Completed => "✅",
        TaskStatus::Failed => "❌",
        TaskStatus::InProgress => "🔄",
        TaskStatus::Pending => "⏳",
    }
}

fn print_summary(summary: &RunSummary) {
    println!("\n{}", "=".repeat(50));
    println!("📊 EXECUTION SUMMARY");
    println!("{}", "=".repeat(50));

    if !summary.tasks.is_empty() {
        println!("\n📋 Tasks:");
        for task in &summary.tasks {
            println!(
                "   {} {}: {}",
                status_marker(task.status),
                task.id(),
                task.description
            );
            if !task.result.is_empty() {
                println!("      → {}", task.result);
            }
        }
    }

    println!("\n🎯 FINAL RESULT:");
    println!("{}", "-".repeat(30));
    println!("{}", summary.final_result);

    let stats = &summary.stats;
    println!("\n📈 Stats:");
    println!("   🔄 Outer iterations: {}", summary.outer_iterations);
    println!("   🔁 Inner iterations: {}", summary.inner_iterations);
    println!("   ✅ Completed: {}/{}", stats.completed, stats.total);
    let status = match (summary.workflow_complete, stats.succeeded) {
        (true, true) => "Complete",
        (true, false) => "Stopped early",
        (false, _) => "Incomplete",
    };
    println!("   🎯 Status: {status}");
}
