//! Text rendering for the three session views.

use std::fmt::Write;

use clipgen_models::{AssetSummary, Platform, ProcessingResult, ProcessingStep};

const SCORE_BAR_WIDTH: usize = 30;

/// Asset list shown before processing starts.
pub fn upload_grid(assets: &[AssetSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Uploaded ({})", assets.len());
    for asset in assets {
        let probed = if asset.probed { "" } else { " (estimated)" };
        let _ = writeln!(
            out,
            "  {:<40} {:>6}s{}  {}",
            truncate(&asset.name, 40),
            asset.duration.round() as u64,
            probed,
            human_size(asset.size)
        );
    }
    out
}

/// Checklist of processing milestones for the given progress.
pub fn progress_steps(progress: u8) -> String {
    ProcessingStep::ALL
        .iter()
        .map(|step| {
            let mark = if step.is_reached(progress) { "[x]" } else { "[ ]" };
            format!("  {} {}", mark, step.label())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Label of the latest reached milestone, or a waiting message.
pub fn current_step_label(progress: u8) -> &'static str {
    ProcessingStep::ALL
        .iter()
        .rev()
        .find(|step| step.is_reached(progress))
        .map(|step| step.label())
        .unwrap_or("Analyzing video...")
}

pub fn score_bar(score: u8, width: usize) -> String {
    let filled = (score.min(100) as usize * width + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Result dashboard with the selected platform tab.
pub fn dashboard(result: &ProcessingResult, platform: Platform) -> String {
    let strategy = &result.strategy;
    let mut out = String::new();

    let _ = writeln!(out, "Done! Cut down to the best quarter.");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Short: {}s / {}s",
        result.target_duration.round() as u64,
        result.original_duration.round() as u64
    );
    let _ = writeln!(out, "Title: {}", strategy.title);
    let preview_tags: Vec<&str> = strategy.hashtags.iter().take(3).map(String::as_str).collect();
    if !preview_tags.is_empty() {
        let _ = writeln!(out, "       {}", preview_tags.join(" "));
    }
    let _ = writeln!(out);

    let score = result.display_score();
    let _ = writeln!(
        out,
        "Viral score: {}/100 {}",
        score,
        score_bar(score, SCORE_BAR_WIDTH)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Description:");
    let _ = writeln!(out, "  {}", strategy.description);
    let _ = writeln!(out);

    let tabs: Vec<String> = [Platform::Youtube, Platform::Tiktok]
        .iter()
        .map(|p| {
            if *p == platform {
                format!("[{}]", p.display_name())
            } else {
                format!(" {} ", p.display_name())
            }
        })
        .collect();
    let _ = writeln!(out, "{}", tabs.join(" "));
    match platform {
        Platform::Youtube => {
            let youtube = &strategy.platforms.youtube;
            let _ = writeln!(out, "  Title: {}", youtube.title);
            let _ = writeln!(out, "  Tags:  {}", youtube.tags.join(", "));
        }
        Platform::Tiktok => {
            let tiktok = &strategy.platforms.tiktok;
            let _ = writeln!(out, "  Caption: {}", tiktok.caption);
            let _ = writeln!(out, "  Tags:    {}", tiktok.tags.join(", "));
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Highlights:");
    if strategy.highlight_segments.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for segment in &strategy.highlight_segments {
        let _ = writeln!(
            out,
            "  {} - {}  {}",
            segment.start_clock(),
            segment.end_clock(),
            segment.description
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Hashtags: {}", strategy.hashtags.join(" "));

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(max.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
