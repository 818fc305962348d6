//! # Slow-burn walkthrough
//!
//! Plays a scripted chat through the engine: first contact, a push that comes
//! too early, weeks of steady conversation, a quarrel, a branch restore and a
//! few configuration commands. Prints affection, stage and directive as it goes.
//!
//! ```bash
//! RUST_LOG=slow_burn=debug cargo run --example slow_burn
//! ```

use std::cell::Cell;
use std::rc::Rc;

use slow_burn_core::{
    Engine, EngineConfig, LedgerSnapshot, ProgressReport, ProgressionLedger, MAX_AFFECTION,
};
use tracing_subscriber::EnvFilter;

const MINUTE_MS: i64 = 60 * 1000;

// ── Display helpers ───────────────────────────────────────────────────────────

fn bar(affection: i32) -> String {
    let filled = (affection * 30 / MAX_AFFECTION) as usize;
    let empty = 30usize.saturating_sub(filled);
    format!("[{}{}] {:>3}", "█".repeat(filled), "░".repeat(empty), affection)
}

fn row(label: &str, ledger: &ProgressionLedger) {
    println!(
        "  {:<34} {} {}",
        label,
        bar(ledger.affection()),
        ledger.stage().label()
    );
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("╔══════════════════════════════════════════════════════════════════════╗");
    println!("║  Slow-burn walkthrough: one character, one user, many evenings       ║");
    println!("╚══════════════════════════════════════════════════════════════════════╝\n");

    let now = Rc::new(Cell::new(1_700_000_000_000_i64));
    let clock = {
        let now = Rc::clone(&now);
        move || now.get()
    };
    let mut engine = Engine::with_clock(EngineConfig::default().with_verbose_logging(true), clock);

    let loaded = engine.load(1, None, None);
    let mut ledger = loaded.ledger;
    let mut record = loaded.record;

    // ── Configuration ────────────────────────────────────────────────────────
    println!("▶  Setup\n");
    for cmd in ["((stage options))", "((set archetype shy))", "((set pacing fast))", "((set pacing warp))"] {
        let out = engine.before_prompt(ledger, record, cmd);
        println!("  > {cmd}");
        println!("    {}\n", out.notice.as_deref().unwrap_or("").replace('\n', "\n    "));
        ledger = out.ledger;
        record = out.record;
    }

    // ── First contact ────────────────────────────────────────────────────────
    println!("▶  First contact\n");
    let out = engine.before_prompt(ledger, record, "You're beautiful and I love talking to you");
    row("too much, too soon", &out.ledger);
    println!("    notice:    {}", out.notice.as_deref().unwrap_or("-"));
    println!("    directive: {}\n", out.directive);
    ledger = out.ledger;
    record = out.record;

    // ── Evenings ─────────────────────────────────────────────────────────────
    println!("▶  Evenings of steady conversation\n");
    let script = [
        "What do you like to do on weekends?",
        "Haha, that's hilarious. I'd never have guessed.",
        "Remember the bookshop you mentioned before? I went there today.",
        "I've been worried about work lately, it's been difficult.",
        "Tell me about the place you grew up?",
    ];
    for evening in 1..=12 {
        for line in script {
            now.set(now.get() + 4 * MINUTE_MS);
            let out = engine.before_prompt(ledger, record, line);
            ledger = out.ledger;
            record = out.record;

            let reply = engine.after_response(&ledger, "She smiles and takes your hand, a little shy.");
            ledger = reply.ledger;
        }
        if evening % 3 == 0 {
            row(&format!("evening {evening}"), &ledger);
        }
    }
    println!();

    // ── A quarrel ────────────────────────────────────────────────────────────
    println!("▶  A quarrel\n");
    let before = ledger.clone();
    let out = engine.before_prompt(ledger, record, "Ugh, that was a stupid thing to say.");
    row("before", &before);
    row("after", &out.ledger);
    println!(
        "    topics still open: {}\n",
        out.record
            .topics_in_order()
            .iter()
            .map(|t| t.label())
            .collect::<Vec<_>>()
            .join(", ")
    );
    ledger = out.ledger;
    record = out.record;

    // ── Branch restore ───────────────────────────────────────────────────────
    println!("▶  Branch restore from a damaged snapshot\n");
    let mut damaged: LedgerSnapshot = ledger.snapshot();
    damaged.archetype = Some(String::new());
    damaged.affection = Some(9_000.0);
    let restored = engine.restore(&damaged);
    row("restored", &restored);
    println!("    archetype: {}\n", restored.archetype());

    // ── Status ───────────────────────────────────────────────────────────────
    println!("▶  Status\n");
    println!("{}", ProgressReport::new(&ledger, &record));

    println!("▶  Significant events\n");
    for e in record.events() {
        println!("  {:<36} affection {}", e.event, e.affection_at_time);
    }

    println!("\n▶  Last diagnostic lines\n");
    let lines = engine.diagnostics().recent();
    for line in lines.iter().rev().take(5).rev() {
        println!("  {line}");
    }
}
