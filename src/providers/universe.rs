// =============================================================================
// Universe Provider — S&P 500 constituents
// =============================================================================
//
// Scrapes the constituents table from the Wikipedia S&P 500 page.  The page
// blocks requests without a browser-looking User-Agent, hence the header.
//
// Parsing is deliberately narrow: locate the table with id="constituents",
// walk its rows, and take the first cell's anchor text as the ticker.
// Dots in class-share tickers (BRK.B) are normalized to dashes, which is
// what the fundamentals provider expects.

use anyhow::{Context, Result};
use tracing::{debug, warn};

const UNIVERSE_URL: &str = "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies";
const USER_AGENT: &str = "Mozilla/5.0";
/// Tickers longer than this are parser artifacts, not symbols.
const MAX_TICKER_LEN: usize = 6;

/// Fetch the current S&P 500 ticker list, in table order.
///
/// Empty on any failure — the pipeline treats an empty universe as fatal
/// downstream, nothing to recover here.
pub async fn fetch_sp500_tickers(client: &reqwest::Client) -> Vec<String> {
    match try_fetch(client).await {
        Ok(tickers) => {
            debug!(count = tickers.len(), "universe list fetched");
            tickers
        }
        Err(e) => {
            warn!(error = %e, "universe fetch failed — returning empty list");
            Vec::new()
        }
    }
}

async fn try_fetch(client: &reqwest::Client) -> Result<Vec<String>> {
    let html = client
        .get(UNIVERSE_URL)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await
        .context("GET S&P 500 constituents page")?
        .error_for_status()
        .context("constituents page returned an error status")?
        .text()
        .await
        .context("failed to read constituents page body")?;

    Ok(parse_constituents(&html))
}

/// Extract tickers from the first column of the constituents table.
fn parse_constituents(html: &str) -> Vec<String> {
    let Some(start) = html.find("id=\"constituents\"") else {
        return Vec::new();
    };
    let table = &html[start..];
    let table = &table[..table.find("</table>").unwrap_or(table.len())];

    let mut tickers = Vec::new();
    for row in table.split("<tr").skip(1) {
        // Header rows carry <th> cells only.
        let Some(cell_start) = row.find("<td") else {
            continue;
        };
        let Some(symbol) = anchor_text(&row[cell_start..]) else {
            continue;
        };
        let symbol = symbol.trim();
        let valid = !symbol.is_empty()
            && symbol.len() <= MAX_TICKER_LEN
            && symbol
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-');
        if valid {
            tickers.push(symbol.replace('.', "-"));
        }
    }
    tickers
}

/// Inner text of the first anchor in `fragment`.
fn anchor_text(fragment: &str) -> Option<&str> {
    let a = fragment.find("<a")?;
    let rest = &fragment[a..];
    let rest = &rest[rest.find('>')? + 1..];
    Some(&rest[..rest.find("</a>")?])
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r##"
        <html><body>
        <table class="wikitable sortable" id="constituents">
        <tbody>
        <tr><th>Symbol</th><th>Security</th></tr>
        <tr>
          <td><a rel="nofollow" href="https://www.nyse.com/quote/XNYS:MMM">MMM</a></td>
          <td><a href="/wiki/3M">3M</a></td>
        </tr>
        <tr>
          <td><a rel="nofollow" href="https://www.nyse.com/quote/XNYS:BRK.B">BRK.B</a></td>
          <td><a href="/wiki/Berkshire_Hathaway">Berkshire Hathaway</a></td>
        </tr>
        <tr>
          <td><a rel="nofollow" href="https://www.nasdaq.com/symbol/aapl">AAPL</a></td>
          <td><a href="/wiki/Apple_Inc.">Apple</a></td>
        </tr>
        </tbody>
        </table>
        <table id="changes"><tbody>
        <tr><td><a href="#">ZZZZ</a></td></tr>
        </tbody></table>
        </body></html>
    "##;

    #[test]
    fn parses_tickers_in_table_order() {
        let tickers = parse_constituents(FIXTURE);
        assert_eq!(tickers, vec!["MMM", "BRK-B", "AAPL"]);
    }

    #[test]
    fn dots_are_normalized_to_dashes() {
        let tickers = parse_constituents(FIXTURE);
        assert!(tickers.contains(&"BRK-B".to_string()));
        assert!(!tickers.iter().any(|t| t.contains('.')));
    }

    #[test]
    fn ignores_tables_other_than_constituents() {
        let tickers = parse_constituents(FIXTURE);
        assert!(!tickers.contains(&"ZZZZ".to_string()));
    }

    #[test]
    fn missing_table_yields_empty_list() {
        assert!(parse_constituents("<html><body>nothing here</body></html>").is_empty());
    }

    #[test]
    fn skips_rows_without_a_symbol_anchor() {
        let html = r##"
            <table id="constituents">
            <tr><th>Symbol</th></tr>
            <tr><td>no anchor</td></tr>
            <tr><td><a href="#">TXN</a></td></tr>
            </table>
        "##;
        assert_eq!(parse_constituents(html), vec!["TXN"]);
    }
}
