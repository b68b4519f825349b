// Server-rendered HTML pages
//
// Plain string templates. Every piece of user-supplied text goes through
// `escape_html` before it lands in markup.

use crate::entities::{Category, CategoryIndex, Transaction, DATE_FORMAT};
use crate::summary::DashboardSummary;
use std::fmt::Write;

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:960px;margin:2rem auto;padding:0 1rem;color:#222}
nav a{margin-right:1rem}
table{border-collapse:collapse;width:100%}
th,td{text-align:left;padding:.35rem .5rem;border-bottom:1px solid #ddd}
td.amount{text-align:right;font-variant-numeric:tabular-nums}
.income{color:#1a7f37}.expense{color:#cf222e}
.notice{background:#fff8c5;border:1px solid #d4a72c;padding:.5rem 1rem;margin:1rem 0}
.cards{display:flex;gap:1rem}.card{flex:1;border:1px solid #ddd;padding:1rem}
form.inline{display:inline}";

// ============================================================================
// HELPERS
// ============================================================================

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Two decimals for display only; stored values are never rounded
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

fn amount_class(tx: &Transaction) -> &'static str {
    if tx.is_expense() {
        "expense"
    } else {
        "income"
    }
}

fn layout(title: &str, notice: Option<&str>, body: &str) -> String {
    let notice_html = notice
        .filter(|n| !n.is_empty())
        .map(|n| format!("<div class=\"notice\">{}</div>", escape_html(n)))
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>
<html lang=\"en\">
<head>
<meta charset=\"utf-8\">
<title>{title} · Pocket Ledger</title>
<style>{style}</style>
</head>
<body>
<nav><a href=\"/\">Dashboard</a><a href=\"/transactions\">Transactions</a><a href=\"/categories\">Categories</a><a href=\"/export.csv\">Export CSV</a></nav>
<h1>{title}</h1>
{notice}
{body}
</body>
</html>
",
        title = escape_html(title),
        style = STYLE,
        notice = notice_html,
        body = body,
    )
}

fn transaction_rows(transactions: &[Transaction], with_actions: bool) -> String {
    let mut rows = String::new();
    for tx in transactions {
        let _ = write!(
            rows,
            "<tr><td>{date}</td><td>{description}</td><td>{category}</td><td class=\"amount {class}\">{amount}</td>",
            date = tx.date.format(DATE_FORMAT),
            description = escape_html(&tx.description),
            category = escape_html(tx.category_label()),
            class = amount_class(tx),
            amount = format_amount(tx.amount),
        );
        if with_actions {
            let _ = write!(
                rows,
                "<td><a href=\"/transactions/{id}/edit\">Edit</a> \
                 <form class=\"inline\" method=\"post\" action=\"/transactions/{id}/delete\">\
                 <button type=\"submit\">Delete</button></form></td>",
                id = tx.id,
            );
        }
        rows.push_str("</tr>\n");
    }
    rows
}

// ============================================================================
// PAGES
// ============================================================================

/// GET /
pub fn index_page(summary: &DashboardSummary, notice: Option<&str>) -> String {
    let recent = if summary.recent.is_empty() {
        "<p>No transactions yet. <a href=\"/transactions/new\">Add one</a>.</p>".to_string()
    } else {
        format!(
            "<table><thead><tr><th>Date</th><th>Description</th><th>Category</th><th>Amount</th></tr></thead>\n<tbody>\n{}</tbody></table>",
            transaction_rows(&summary.recent, false)
        )
    };

    let body = format!(
        "<div class=\"cards\">
<div class=\"card\"><h3>Income</h3><p class=\"income\" id=\"total-income\">{income}</p></div>
<div class=\"card\"><h3>Expenses</h3><p class=\"expense\" id=\"total-expenses\">{expenses}</p></div>
<div class=\"card\"><h3>Net</h3><p id=\"net-total\">{net}</p></div>
</div>
<h2>Last 6 months</h2>
<canvas id=\"trend\" height=\"120\"></canvas>
<script src=\"https://cdn.jsdelivr.net/npm/chart.js\"></script>
<script>
fetch('/api/summary').then(r => r.json()).then(s => {{
  new Chart(document.getElementById('trend'), {{
    type: 'bar',
    data: {{ labels: s.labels, datasets: [{{ label: 'Net total', data: s.data }}] }}
  }});
}});
</script>
<h2>Recent transactions</h2>
{recent}",
        income = format_amount(summary.income),
        expenses = format_amount(summary.expenses),
        net = format_amount(summary.net()),
        recent = recent,
    );

    layout("Dashboard", notice, &body)
}

/// GET /transactions
pub fn transactions_page(
    transactions: &[Transaction],
    categories: &[Category],
    notice: Option<&str>,
) -> String {
    let body = format!(
        "<p><a href=\"/transactions/new\">New transaction</a> · {count} transactions · {cat_count} categories</p>
<table><thead><tr><th>Date</th><th>Description</th><th>Category</th><th>Amount</th><th></th></tr></thead>
<tbody>
{rows}</tbody></table>",
        count = transactions.len(),
        cat_count = categories.len(),
        rows = transaction_rows(transactions, true),
    );

    layout("Transactions", notice, &body)
}

/// GET /transactions/new and GET /transactions/:id/edit
pub fn transaction_form_page(categories: &[Category], tx: Option<&Transaction>) -> String {
    let (title, action) = match tx {
        Some(tx) => ("Edit transaction", format!("/transactions/{}/edit", tx.id)),
        None => ("New transaction", "/transactions/new".to_string()),
    };

    let selected = tx.and_then(|t| t.category_id);
    let mut options = String::from("<option value=\"\">(none)</option>");
    for category in categories {
        let _ = write!(
            options,
            "<option value=\"{id}\"{sel}>{name}</option>",
            id = category.id,
            sel = if selected == Some(category.id) { " selected" } else { "" },
            name = escape_html(&category.name),
        );
    }

    let body = format!(
        "<form method=\"post\" action=\"{action}\">
<p><label>Description <input name=\"description\" value=\"{description}\"></label></p>
<p><label>Amount <input name=\"amount\" value=\"{amount}\" required></label> (negative = expense)</p>
<p><label>Date <input type=\"date\" name=\"date\" value=\"{date}\"></label></p>
<p><label>Category <select name=\"category\">{options}</select></label></p>
<p><button type=\"submit\">Save</button> <a href=\"/transactions\">Cancel</a></p>
</form>",
        action = action,
        description = tx.map(|t| escape_html(&t.description)).unwrap_or_default(),
        amount = tx.map(|t| t.amount.to_string()).unwrap_or_default(),
        date = tx.map(|t| t.date.format(DATE_FORMAT).to_string()).unwrap_or_default(),
        options = options,
    );

    layout(title, None, &body)
}

/// GET /categories
pub fn categories_page(categories: &[Category], index: &CategoryIndex, notice: Option<&str>) -> String {
    let mut rows = String::new();
    for category in categories {
        let _ = write!(
            rows,
            "<tr><td>{name}</td><td>{count}</td><td>\
             <form class=\"inline\" method=\"post\" action=\"/categories/{id}/delete\">\
             <button type=\"submit\">Delete</button></form></td></tr>\n",
            name = escape_html(&category.name),
            count = index.count(category.id),
            id = category.id,
        );
    }

    let body = format!(
        "<form method=\"post\" action=\"/categories/add\">
<input name=\"name\" placeholder=\"New category\"> <button type=\"submit\">Add</button>
</form>
<table><thead><tr><th>Name</th><th>Transactions</th><th></th></tr></thead>
<tbody>
{rows}</tbody></table>",
        rows = rows,
    );

    layout("Categories", notice, &body)
}

pub fn error_page(title: &str, message: &str) -> String {
    layout(title, None, &format!("<p>{}</p>", escape_html(message)))
}
