use crate::dialog::RecommendationDialog;
use crate::models::{AppData, Habit, HabitKind, Settings, MILESTONE_STREAK};
use crate::store::progress;
use chrono::NaiveDate;
use std::fmt::Write;

pub fn render_index(
    today: NaiveDate,
    data: &AppData,
    dialog: &RecommendationDialog,
    error: Option<&str>,
) -> String {
    let progress = progress(&data.habits);
    let theme = if data.settings.dark_mode { "dark" } else { "light" };
    let refresh = if dialog.loading {
        r#"<meta http-equiv="refresh" content="2" />"#
    } else {
        ""
    };
    let error = error
        .map(|message| format!(r#"<p class="error">{}</p>"#, escape(message)))
        .unwrap_or_default();

    INDEX_HTML
        .replace("{{REFRESH}}", refresh)
        .replace("{{THEME}}", theme)
        .replace("{{TODAY}}", &today.format("%A, %B %-d").to_string())
        .replace("{{GOOD_PROGRESS}}", &progress.good.to_string())
        .replace("{{BAD_PROGRESS}}", &progress.bad.to_string())
        .replace("{{GOOD_LIST}}", &render_list(&data.habits.good, HabitKind::Good))
        .replace("{{BAD_LIST}}", &render_list(&data.habits.bad, HabitKind::Bad))
        .replace("{{ERROR}}", &error)
        .replace("{{SETTINGS}}", &render_settings(&data.settings))
        .replace("{{DIALOG}}", &render_dialog(dialog))
}

fn render_list(habits: &[Habit], kind: HabitKind) -> String {
    if habits.is_empty() {
        return r#"<li class="empty">Nothing here yet.</li>"#.to_string();
    }

    let mut out = String::new();
    for habit in habits {
        let base = format!("/habits/{}/{}", kind, habit.id);
        let (mark_label, done_class) = match (kind, habit.marked) {
            (HabitKind::Good, true) => ("Completed", " done"),
            (HabitKind::Good, false) => ("Mark done", ""),
            (HabitKind::Bad, true) => ("Avoided", " done"),
            (HabitKind::Bad, false) => ("Mark avoided", ""),
        };
        let _ = write!(
            out,
            r#"<li class="habit{done_class}">
  <div class="habit-main">
    <span class="name">{name}</span>
    <span class="streak">{streak} days</span>
  </div>
  <div class="habit-actions">
    <form method="post" action="{base}/toggle"><button type="submit">{mark_label}</button></form>
    <form method="post" action="{base}/undo"><button class="ghost" type="submit">Undo today</button></form>
    <form method="post" action="{base}/delete"><button class="ghost" type="submit">Delete</button></form>"#,
            name = escape(&habit.name),
            streak = habit.streak,
        );
        if kind == HabitKind::Bad {
            let _ = write!(
                out,
                r#"
    <form method="post" action="/recommendations/{id}"><button class="ghost" type="submit">Get AI tips</button></form>"#,
                id = habit.id,
            );
        }
        out.push_str("\n  </div>");
        if habit.streak >= MILESTONE_STREAK {
            let _ = write!(
                out,
                r#"
  <p class="milestone">Amazing streak! {} days and counting!</p>"#,
                habit.streak
            );
        }
        out.push_str("\n</li>\n");
    }
    out
}

fn render_settings(settings: &Settings) -> String {
    let rows = [
        ("dark_mode", "Dark mode", settings.dark_mode),
        ("notifications", "Notifications", settings.notifications),
        (
            "streak_reset",
            "Reset streaks automatically at midnight",
            settings.streak_reset,
        ),
    ];
    let mut out = String::new();
    for (name, label, enabled) in rows {
        let state = if enabled { "On" } else { "Off" };
        let _ = write!(
            out,
            r#"<form method="post" action="/settings/{name}"><span>{label}</span><button class="toggle" type="submit">{state}</button></form>
"#
        );
    }
    out
}

fn render_dialog(dialog: &RecommendationDialog) -> String {
    let Some(habit) = dialog.habit.as_ref().filter(|_| dialog.open) else {
        return String::new();
    };

    let body = match (&dialog.recommendations, dialog.loading) {
        (_, true) => r#"<p class="loading">Thinking about it…</p>"#.to_string(),
        (Some(recommendations), false) => {
            let mut out = String::from("<ol>");
            for rec in recommendations {
                let _ = write!(
                    out,
                    "<li><strong>{}</strong><p>{}</p></li>",
                    escape(&rec.title),
                    escape(&rec.description)
                );
            }
            out.push_str("</ol>");
            out
        }
        (None, false) => String::new(),
    };

    format!(
        r#"<section class="dialog">
  <h2>Tips for breaking: {name}</h2>
  {body}
  <div class="habit-actions">
    <form method="post" action="/recommendations/refresh"><button type="submit">Get new tips</button></form>
    <form method="post" action="/recommendations/close"><button class="ghost" type="submit">Close</button></form>
  </div>
</section>"#,
        name = escape(&habit.name)
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  {{REFRESH}}
  <title>Habit Tracker</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --muted: #6b645d;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --tile: white;
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    body.dark {
      --bg-1: #1c1f24;
      --bg-2: #2f4858;
      --ink: #f1ece4;
      --muted: #b7afa5;
      --card: rgba(34, 38, 44, 0.92);
      --tile: #2a2f36;
      --shadow: 0 24px 60px rgba(0, 0, 0, 0.4);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), var(--bg-1) 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1, h2 {
      font-family: "Fraunces", "Georgia", serif;
      margin: 0;
    }

    .subtitle, .empty, .streak {
      color: var(--muted);
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(260px, 1fr));
      gap: 16px;
    }

    .column {
      background: var(--tile);
      border-radius: 18px;
      padding: 18px;
      display: grid;
      gap: 12px;
      align-content: start;
    }

    .progress {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: var(--accent);
    }

    ul {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 10px;
    }

    .habit {
      border: 1px solid rgba(47, 72, 88, 0.12);
      border-radius: 14px;
      padding: 12px;
      display: grid;
      gap: 8px;
    }

    .habit.done .name {
      text-decoration: line-through;
    }

    .habit-main, .habit-actions, .settings form {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 8px;
    }

    .habit-actions {
      justify-content: flex-start;
    }

    .milestone {
      margin: 0;
      color: var(--accent);
      font-weight: 600;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 8px 14px;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    button.ghost {
      background: transparent;
      color: var(--muted);
      border: 1px solid rgba(47, 72, 88, 0.2);
    }

    button.toggle {
      background: var(--accent-2);
    }

    input, select {
      border-radius: 999px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      padding: 8px 14px;
      font: inherit;
    }

    .error {
      margin: 0;
      color: #c63b2b;
    }

    .dialog, .settings {
      background: var(--tile);
      border-radius: 18px;
      padding: 18px;
      display: grid;
      gap: 12px;
    }
  </style>
</head>
<body class="{{THEME}}">
  <main class="app">
    <header>
      <h1>Habit Tracker</h1>
      <p class="subtitle">{{TODAY}}</p>
    </header>
    <form class="habit-actions" method="post" action="/habits">
      <input name="name" placeholder="New habit" />
      <select name="kind">
        <option value="good">Good habit</option>
        <option value="bad">Bad habit</option>
      </select>
      <button type="submit">Add</button>
    </form>
    {{ERROR}}
    {{DIALOG}}
    <section class="panel">
      <div class="column">
        <h2>Build</h2>
        <span class="progress">{{GOOD_PROGRESS}}% completed</span>
        <ul>
{{GOOD_LIST}}
        </ul>
      </div>
      <div class="column">
        <h2>Break</h2>
        <span class="progress">{{BAD_PROGRESS}}% avoided</span>
        <ul>
{{BAD_LIST}}
        </ul>
      </div>
    </section>
    <section class="settings">
      <h2>Settings</h2>
{{SETTINGS}}
    </section>
  </main>
</body>
</html>
"#;
