//! Server-rendered HTML for the planner page.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::error::PlanError;
use crate::pipeline::PlanResult;
use crate::presentation::StatusBoard;
use crate::profile::{
    EXAMPLE_DIET, EXAMPLE_ENERGY_USAGE, EXAMPLE_GOALS, EXAMPLE_TRANSPORTATION, UserProfile,
};

/// What to show below the form.
pub enum Outcome<'a> {
    Pending,
    Success(&'a PlanResult),
    Failure(&'a PlanError),
}

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; min-height: 100vh;
       background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); }
header { text-align: center; color: white; padding: 1.5rem 1rem 0; }
header p { font-size: 1.2em; }
.columns { display: flex; gap: 2rem; padding: 1rem 2rem; flex-wrap: wrap; }
.column { flex: 1 1 24rem; }
.column h3 { color: white; }
form { background: white; padding: 2rem; border-radius: 15px;
       box-shadow: 0 10px 30px rgba(0,0,0,0.2); }
form label { display: block; margin-top: 1rem; font-weight: 600; }
form input, form textarea { width: 100%; box-sizing: border-box; padding: 0.5rem; }
form button { margin-top: 1.5rem; width: 100%; padding: 0.75rem; font-size: 1rem; }
.agent-box { background: #f5f5f5; padding: 1rem; border-radius: 8px;
             border-left: 4px solid #e0e0e0; margin: 0.5rem 0; }
.agent-active { background: #e8f5e9; border-left-color: #4caf50; }
.agent-complete { background: #e3f2fd; border-left-color: #2196f3; }
.result { background: white; margin: 1rem 2rem 2rem; padding: 1.5rem; border-radius: 15px; }
.result textarea { width: 100%; height: 400px; box-sizing: border-box; }
.success { color: #1b5e20; background: #e8f5e9; padding: 0.75rem; border-radius: 6px; }
.error { color: #b71c1c; background: #ffebee; padding: 0.75rem; border-radius: 6px; }
.info { color: #0d47a1; background: #e3f2fd; padding: 0.75rem; border-radius: 6px; }
"#;

/// Streams progress over `/ws` when JavaScript is available; the plain
/// form POST still works without it.
const SCRIPT: &str = r#"
document.getElementById('profile_form').addEventListener('submit', function (ev) {
  if (!window.WebSocket) { return; }
  ev.preventDefault();
  var form = ev.target;
  var profile = {};
  ['transportation', 'diet', 'energy_usage', 'goals'].forEach(function (k) {
    profile[k] = form.elements[k].value;
  });
  document.querySelectorAll('.agent-box').forEach(function (box) {
    box.className = 'agent-box';
    box.dataset.status = 'idle';
    box.querySelector('small').textContent = box.dataset.activity;
  });
  var result = document.getElementById('result');
  result.innerHTML = '<p class="info">🤖 AI Agents are analyzing your profile...</p>';
  var proto = location.protocol === 'https:' ? 'wss://' : 'ws://';
  var ws = new WebSocket(proto + location.host + '/ws');
  ws.onopen = function () { ws.send(JSON.stringify(profile)); };
  ws.onmessage = function (m) {
    var msg = JSON.parse(m.data);
    if (msg.type === 'step_update') {
      var box = document.getElementById('agent-' + msg.step);
      if (!box) { return; }
      box.className = 'agent-box agent-' + msg.status;
      box.dataset.status = msg.status;
      box.querySelector('small').textContent =
        msg.status === 'active' ? '🔄 Working...' : '✅ Complete';
    } else if (msg.type === 'plan_complete') {
      result.innerHTML = '<h2>📋 Your Sustainable Life Plan</h2>' +
        '<p class="success">✅ Plan generated successfully!</p><textarea readonly></textarea>';
      result.querySelector('textarea').value = msg.plan;
      ws.close();
    } else if (msg.type === 'plan_error') {
      var p = document.createElement('p');
      p.className = 'error';
      p.textContent = msg.message;
      result.innerHTML = '';
      result.appendChild(p);
      ws.close();
    }
  };
});
"#;

/// Render the full page.
pub fn render_page(profile: &UserProfile, board: &StatusBoard, outcome: Outcome<'_>) -> String {
    let input = |name: &str, label: &str, value: &Option<String>, placeholder: &str| {
        format!(
            "<label for=\"{name}\">{label}</label>\
             <input type=\"text\" id=\"{name}\" name=\"{name}\" value=\"{value}\" placeholder=\"e.g., {placeholder}\">",
            value = encode_double_quoted_attribute(value.as_deref().unwrap_or("")),
            placeholder = encode_double_quoted_attribute(placeholder),
        )
    };

    let fields = [
        input("transportation", "🚗 Transportation", &profile.transportation, EXAMPLE_TRANSPORTATION),
        input("diet", "🍽️ Diet", &profile.diet, EXAMPLE_DIET),
        input("energy_usage", "⚡ Energy Usage", &profile.energy_usage, EXAMPLE_ENERGY_USAGE),
        format!(
            "<label for=\"goals\">🎯 Goals</label>\
             <textarea id=\"goals\" name=\"goals\" rows=\"3\" placeholder=\"e.g., {placeholder}\">{value}</textarea>",
            value = encode_text(profile.goals.as_deref().unwrap_or("")),
            placeholder = encode_double_quoted_attribute(EXAMPLE_GOALS),
        ),
    ]
    .join("\n");

    let result = match outcome {
        Outcome::Pending => String::new(),
        Outcome::Success(plan) => format!(
            "<h2>📋 Your Sustainable Life Plan</h2>\
             <p class=\"success\">✅ Plan generated successfully!</p>\
             <textarea readonly>{}</textarea>",
            encode_text(&plan.to_string())
        ),
        Outcome::Failure(err) => {
            let mut html = format!("<p class=\"error\">{}</p>", encode_text(&err.user_message()));
            if let Some(hint) = err.hint() {
                html.push_str(&format!("<p class=\"info\">{}</p>", encode_text(hint)));
            }
            html
        }
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>🌱 Sustainable Life Planner</title>
<style>{STYLE}</style>
</head>
<body>
<header>
<h1>🌱 Sustainable Life Planner</h1>
<p>AI-Powered Multi-Agent System for Sustainable Living</p>
</header>
<div class="columns">
<div class="column">
<h3>📝 Your Profile</h3>
<form id="profile_form" method="post" action="/plan">
{fields}
<button type="submit">🚀 Generate My Sustainable Plan</button>
</form>
</div>
<div class="column">
<h3>🤖 AI Agents Working</h3>
{board}
</div>
</div>
<section class="result" id="result">{result}</section>
<script>{SCRIPT}</script>
</body>
</html>
"#,
        board = board.render_html(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::pipeline::Step;

    #[test]
    fn initial_page_has_prefilled_form_and_idle_board() {
        let html = render_page(&UserProfile::example(), &StatusBoard::new(), Outcome::Pending);
        assert!(html.contains("value=\"gasoline car, 20 km daily commute\""));
        assert!(html.contains(">reduce carbon footprint by 30% in 6 months</textarea>"));
        assert_eq!(html.matches("data-status=\"idle\"").count(), 4);
        assert!(html.contains("<section class=\"result\" id=\"result\"></section>"));
    }

    #[test]
    fn user_text_is_escaped() {
        let profile = UserProfile {
            transportation: Some("\"><script>alert(1)</script>".into()),
            goals: Some("</textarea><b>x</b>".into()),
            ..Default::default()
        };
        let html = render_page(&profile, &StatusBoard::new(), Outcome::Pending);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(!html.contains("</textarea><b>"));
    }

    #[test]
    fn failure_shows_message_and_hint() {
        let err = PlanError::Pipeline(PipelineError::EmptyOutput { step: Step::Habits });
        let html = render_page(&UserProfile::example(), &StatusBoard::new(), Outcome::Failure(&err));
        assert!(html.contains("class=\"error\">❌ Error: "));
        assert!(html.contains("Make sure your API key is set correctly"));
    }

    #[test]
    fn credential_failure_has_no_hint() {
        let err = PlanError::MissingCredential {
            env_var: "OPENAI_API_KEY".into(),
        };
        let html = render_page(&UserProfile::example(), &StatusBoard::new(), Outcome::Failure(&err));
        assert!(html.contains("Please set OPENAI_API_KEY in .env file"));
        assert!(!html.contains("class=\"info\">Make sure"));
    }

    #[test]
    fn resubmit_resets_boxes_from_their_activity() {
        let mut board = StatusBoard::new();
        board.apply(crate::pipeline::ProgressEvent::StepCompleted(Step::Carbon));
        let html = render_page(&UserProfile::example(), &board, Outcome::Pending);
        assert!(html.contains("data-activity=\"Calculating your carbon footprint\""));
        assert_eq!(html.matches("data-activity=").count(), 4);

        let reset = SCRIPT.find("box.dataset.activity").unwrap();
        let connect = SCRIPT.find("new WebSocket").unwrap();
        assert!(reset < connect);
    }
}
