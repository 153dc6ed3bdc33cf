// =============================================================================
// HTTP Dashboard — Axum 0.7
// =============================================================================
//
// A single route (`/`) renders the latest pipeline result as a static HTML
// page.  The page carries a meta-refresh directive so browsers poll for the
// background pipeline's completion; until then a loading card is shown.
//
// All numeric rounding lives here, on already-ranked values — the scoring
// contract works on unrounded numbers.

use std::sync::Arc;

use axum::{extract::State, response::Html, routing::get, Router};

use crate::app_state::{AppState, PipelineResult};
use crate::scoring::ScoredSecurity;

/// Client-side poll interval, seconds.
const REFRESH_SECS: u32 = 60;

/// Build the router: one route, shared state, nothing else.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new().route("/", get(dashboard)).with_state(state)
}

async fn dashboard(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_page(state.latest().as_deref()))
}

// =============================================================================
// Rendering
// =============================================================================

const STYLE: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif; background: #f0f2f5; margin: 0; padding: 20px; color: #333; }
.container { max-width: 1100px; margin: 0 auto; }
.header { background: white; padding: 20px; border-radius: 10px; box-shadow: 0 2px 5px rgba(0,0,0,0.1); margin-bottom: 20px; display: flex; justify-content: space-between; align-items: center; }
.regime-badge { background: #333; color: white; padding: 10px 20px; border-radius: 5px; font-weight: bold; font-size: 1.2em; }
.regime-desc { color: #666; margin-top: 5px; font-size: 0.9em; }
.grid { display: grid; grid-template-columns: 1fr 1fr; gap: 20px; }
.card { background: white; padding: 20px; border-radius: 10px; box-shadow: 0 2px 5px rgba(0,0,0,0.1); }
h2 { border-bottom: 2px solid #eee; padding-bottom: 10px; margin-top: 0; font-size: 1.1em; text-transform: uppercase; letter-spacing: 1px; }
.long { border-top: 4px solid #48bb78; }
.short { border-top: 4px solid #f56565; }
table { width: 100%; border-collapse: collapse; font-size: 0.85em; }
th { text-align: left; color: #888; padding: 8px; border-bottom: 1px solid #eee; }
td { padding: 8px; border-bottom: 1px solid #f9f9f9; }
tr:last-child td { border-bottom: none; }
.score { font-weight: bold; }
.pos { color: #2f855a; }
.neg { color: #c53030; }
.loading { text-align: center; padding: 50px; }
"#;

fn render_page(result: Option<&PipelineResult>) -> String {
    let body = match result {
        Some(r) => render_ready(r),
        None => render_loading(),
    };
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<title>Regime Z-Score Dashboard</title>\n\
         <meta http-equiv=\"refresh\" content=\"{REFRESH_SECS}\">\n\
         <style>{STYLE}</style>\n</head>\n<body>\n<div class=\"container\">\n{body}\n</div>\n</body>\n</html>"
    )
}

fn render_loading() -> String {
    "<div class=\"card loading\">\n\
     <h1>Running Analysis...</h1>\n\
     <p>Fetching S&amp;P 500 metrics &amp; calculating z-scores.</p>\n\
     <p>Please wait ~5-10 minutes for the full fetch.</p>\n\
     <p><strong>Page will auto-refresh.</strong></p>\n\
     </div>"
        .to_string()
}

fn render_ready(result: &PipelineResult) -> String {
    let regime = &result.regime;
    let header = format!(
        "<div class=\"header\">\n<div>\n<h1>Z-Score Strategy Dashboard</h1>\n\
         <div class=\"regime-desc\">{note}</div>\n\
         <small>Last Updated: {updated}</small>\n</div>\n\
         <div style=\"text-align: right;\">\n\
         <div class=\"regime-badge\">REGIME {letter}</div>\n\
         <div style=\"font-size: 0.8em; margin-top:5px;\">\n\
         Rate: {rate:.2}% (Avg {rate_avg:.2})<br>\n\
         Liquidity: ${bs:.0}B (Avg ${bs_avg:.0}B)\n\
         </div>\n</div>\n</div>",
        note = escape(&result.strategy_note),
        updated = result.computed_at.format("%Y-%m-%d %H:%M:%S"),
        letter = regime.regime.letter(),
        rate = regime.rate_current,
        rate_avg = regime.rate_avg,
        // WALCL is reported in millions; divide to billions for display.
        bs = regime.balance_sheet_current / 1000.0,
        bs_avg = regime.balance_sheet_avg / 1000.0,
    );

    let longs = render_table(
        &format!("Top {} Longs (Highest Score)", result.long_candidates.len()),
        "long",
        "pos",
        &result.long_candidates,
    );
    let shorts = render_table(
        &format!("Top {} Shorts (Lowest Score)", result.short_candidates.len()),
        "short",
        "neg",
        &result.short_candidates,
    );

    format!("{header}\n<div class=\"grid\">\n{longs}\n{shorts}\n</div>")
}

fn render_table(title: &str, card_class: &str, score_class: &str, rows: &[ScoredSecurity]) -> String {
    let mut out = format!(
        "<div class=\"card {card_class}\">\n<h2>{title}</h2>\n<table>\n<thead>\n<tr>\
         <th>Ticker</th><th>Growth</th><th>Margin</th><th>PE</th>\
         <th>Z-Grow</th><th>Z-Prof</th><th>Score</th></tr>\n</thead>\n<tbody>\n"
    );
    for s in rows {
        out.push_str(&format!(
            "<tr><td><strong>{ticker}</strong></td>\
             <td>{growth:.2}%</td><td>{margin:.2}%</td><td>{pe:.1}</td>\
             <td>{zg:.2}</td><td>{zp:.2}</td>\
             <td class=\"score {score_class}\">{score:.2}</td></tr>\n",
            ticker = escape(&s.ticker),
            growth = s.growth,
            margin = s.margin,
            pe = s.valuation_ratio,
            zg = s.z_growth,
            zp = s.z_profitability,
            score = s.final_score,
        ));
    }
    out.push_str("</tbody>\n</table>\n</div>");
    out
}

/// Minimal HTML escaping for text that originates upstream.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
