use crate::models::Dashboard;

/// Fills `{{NAME}}` placeholders in one pass over the template, so inserted
/// values are never scanned for placeholders themselves.
pub fn render_index(dashboard: &Dashboard) -> String {
    let mut html = String::with_capacity(INDEX_HTML.len() + 256);
    let mut rest = INDEX_HTML;
    while let Some(open) = rest.find("{{") {
        html.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            rest = &rest[open..];
            break;
        };
        match placeholder(dashboard, &after[..close]) {
            Some(value) => html.push_str(&value),
            None => html.push_str(&rest[open..open + close + 4]),
        }
        rest = &after[close + 2..];
    }
    html.push_str(rest);
    html
}

fn placeholder(dashboard: &Dashboard, name: &str) -> Option<String> {
    let value = match name {
        "DATE" => escape_html(&dashboard.date),
        "GOAL" => dashboard.goal.to_string(),
        "TOTAL" => dashboard.total.to_string(),
        "PERCENT" => dashboard.percent.to_string(),
        "UNIT" => escape_html(&dashboard.unit),
        "REMINDER" => escape_html(&dashboard.reminder_label),
        _ => return None,
    };
    Some(value)
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>HydroPulse</title>
  <style>
    :root {
      --bg-1: #e8f6fb;
      --bg-2: #bfe8f5;
      --ink: #1f2d3a;
      --accent: #0ea5c6;
      --accent-2: #1f4e6b;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(31, 78, 107, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #dff3fa 60%, #f3fbfe 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", system-ui, sans-serif;
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

    h1 {
      font-family: "Georgia", serif;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    .subtitle {
      margin: 0;
      color: #5b6b78;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(31, 78, 107, 0.08);
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #7b8a96;
    }

    .stat .value {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .bar {
      height: 14px;
      border-radius: 999px;
      background: rgba(31, 78, 107, 0.1);
      overflow: hidden;
    }

    .bar-inner {
      height: 100%;
      background: var(--accent);
      transition: width 300ms ease;
    }

    .actions {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      align-items: center;
    }

    button, input, select {
      font: inherit;
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 12px 18px;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    button.secondary {
      background: var(--accent-2);
    }

    input, select {
      border-radius: 12px;
      border: 1px solid rgba(31, 78, 107, 0.2);
      padding: 10px 12px;
      width: 120px;
    }

    .log {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 8px;
    }

    .log li {
      display: flex;
      justify-content: space-between;
      background: white;
      border-radius: 12px;
      padding: 10px 14px;
    }

    .muted {
      color: #7b8a96;
    }

    #chart {
      width: 100%;
      height: 240px;
      display: block;
      background: white;
      border-radius: 20px;
    }

    .chart-line {
      fill: none;
      stroke: var(--accent);
      stroke-width: 3;
    }

    .chart-point {
      fill: white;
      stroke: var(--accent);
      stroke-width: 2;
    }

    .chart-grid {
      stroke: rgba(31, 78, 107, 0.12);
    }

    .chart-label {
      fill: #7b8a96;
      font-size: 11px;
    }

    .status {
      min-height: 1.2em;
      color: #5b6b78;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>HydroPulse</h1>
      <p class="subtitle">Today: <span id="date">{{DATE}}</span></p>
    </header>

    <section class="panel">
      <div class="stat">
        <span class="label">Total</span>
        <span class="value"><span id="total">{{TOTAL}}</span> <span class="unit">{{UNIT}}</span></span>
      </div>
      <div class="stat">
        <span class="label">Goal</span>
        <span class="value"><span id="goal">{{GOAL}}</span> <span class="unit">{{UNIT}}</span></span>
      </div>
      <div class="stat">
        <span class="label">Progress</span>
        <span class="value" id="percent">{{PERCENT}}%</span>
      </div>
    </section>

    <div class="bar"><div class="bar-inner" id="bar" style="width: {{PERCENT}}%"></div></div>

    <section class="actions">
      <button type="button" data-add="250">+250</button>
      <button type="button" data-add="500">+500</button>
      <input id="quick-input" type="number" placeholder="Amount" />
      <button type="button" id="quick-btn">Add</button>
      <form method="post" action="/intake/undo"><button class="secondary" id="undo-btn" type="submit">Undo</button></form>
      <form method="post" action="/intake/reset"><button class="secondary" id="reset-btn" type="submit">Reset today</button></form>
    </section>

    <section class="actions">
      <label>Goal <input id="goal-input" type="number" min="0" max="100000" value="{{GOAL}}" /></label>
      <label>Unit
        <select id="unit-select">
          <option value="ml">ml</option>
          <option value="oz">oz</option>
          <option value="cups">cups</option>
        </select>
      </label>
      <button type="button" class="secondary" id="notify-btn">{{REMINDER}}</button>
    </section>

    <section>
      <h2>Last 7 days</h2>
      <svg id="chart" viewBox="0 0 600 240" aria-label="Intake trend" role="img"></svg>
    </section>

    <section>
      <h2>Today's log</h2>
      <ul class="log" id="log"></ul>
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const byId = (id) => document.getElementById(id);
    const statusEl = byId('status');
    const chartEl = byId('chart');
    let lastReminder = 0;

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const renderChart = (trend) => {
      if (!trend.length) {
        chartEl.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No history yet, come back tomorrow.</text>';
        return;
      }

      const width = 600;
      const height = 240;
      const padding = 32;
      const w = width - padding * 2;
      const h = height - padding * 2;
      const x = (index) => padding + (w * index) / Math.max(1, trend.length - 1);
      const y = (ratio) => padding + h - ratio * h;

      let grid = '';
      for (let i = 0; i <= 4; i += 1) {
        const yPos = padding + (h * i) / 4;
        grid += `<line class="chart-grid" x1="${padding}" y1="${yPos}" x2="${width - padding}" y2="${yPos}" />`;
      }

      const path = trend
        .map((point, index) => `${index === 0 ? 'M' : 'L'} ${x(index).toFixed(2)} ${y(point.ratio).toFixed(2)}`)
        .join(' ');
      const circles = trend
        .map((point, index) => `<circle class="chart-point" cx="${x(index)}" cy="${y(point.ratio)}" r="4"><title>${point.total}</title></circle>`)
        .join('');
      const labels = trend
        .map((point, index) => `<text class="chart-label" x="${x(index)}" y="${height - 8}" text-anchor="middle">${point.date.slice(5)}</text>`)
        .join('');

      chartEl.innerHTML = `${grid}<path class="chart-line" d="${path}" />${circles}${labels}`;
    };

    const renderLog = (data) => {
      const list = byId('log');
      list.innerHTML = '';
      if (!data.log.length) {
        const item = document.createElement('li');
        item.className = 'muted';
        item.textContent = 'No entries yet. Add your first sip!';
        list.appendChild(item);
        return;
      }
      data.log.forEach((entry) => {
        const item = document.createElement('li');
        const amount = document.createElement('strong');
        amount.textContent = `+${entry.amount}${data.unit}`;
        const time = document.createElement('span');
        time.className = 'muted';
        time.textContent = new Date(entry.at).toLocaleTimeString();
        item.append(amount, time);
        list.appendChild(item);
      });
    };

    const renderAll = (data) => {
      byId('date').textContent = data.date;
      byId('total').textContent = data.total;
      byId('goal').textContent = data.goal;
      byId('percent').textContent = `${data.percent}%`;
      byId('bar').style.width = `${data.percent}%`;
      document.querySelectorAll('.unit').forEach((el) => { el.textContent = data.unit; });
      if (document.activeElement !== byId('goal-input')) {
        byId('goal-input').value = data.goal;
      }
      byId('unit-select').value = data.unit;
      byId('notify-btn').textContent = data.reminder_label;
      renderLog(data);
      renderChart(data.trend);
    };

    const send = async (method, url, body) => {
      const res = await fetch(url, {
        method,
        headers: { 'content-type': 'application/json' },
        body: body === undefined ? undefined : JSON.stringify(body)
      });
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      const data = await res.json();
      renderAll(data.dashboard);
      setStatus(data.persisted ? '' : 'Saved for now, but could not be written to disk.', data.persisted ? '' : 'error');
    };

    const run = (promise) => promise.catch((err) => setStatus(err.message, 'error'));

    document.querySelectorAll('[data-add]').forEach((btn) => {
      btn.addEventListener('click', () => run(send('POST', '/api/intake', { amount: btn.dataset.add })));
    });
    byId('quick-btn').addEventListener('click', () => {
      run(send('POST', '/api/intake', { amount: byId('quick-input').value || '0' }));
    });
    byId('undo-btn').addEventListener('click', (event) => {
      event.preventDefault();
      run(send('POST', '/api/undo'));
    });
    byId('reset-btn').addEventListener('click', (event) => {
      event.preventDefault();
      run(send('POST', '/api/reset'));
    });
    byId('goal-input').addEventListener('input', (event) => {
      run(send('PUT', '/api/goal', { goal: event.target.value }));
    });
    byId('unit-select').addEventListener('change', (event) => {
      run(send('PUT', '/api/unit', { unit: event.target.value }));
    });
    byId('notify-btn').addEventListener('click', async () => {
      if ('Notification' in window && Notification.permission !== 'granted') {
        await Notification.requestPermission();
      }
      run(send('POST', '/api/notify'));
    });

    const pollReminders = async () => {
      const res = await fetch(`/api/reminders?after=${lastReminder}`);
      if (!res.ok) {
        return;
      }
      const reminders = await res.json();
      reminders.forEach((reminder) => {
        lastReminder = Math.max(lastReminder, reminder.id);
        if ('Notification' in window && Notification.permission === 'granted') {
          new Notification(reminder.title, { body: reminder.body });
        }
      });
    };

    const refresh = async () => {
      const res = await fetch('/api/today');
      if (!res.ok) {
        throw new Error('Unable to load today');
      }
      renderAll(await res.json());
    };

    run(refresh());
    run(fetch('/api/reminders').then((res) => res.json()).then((items) => {
      items.forEach((item) => { lastReminder = Math.max(lastReminder, item.id); });
    }));
    setInterval(() => run(refresh()), 60 * 1000);
    setInterval(() => run(pollReminders()), 60 * 1000);
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboard(unit: &str) -> Dashboard {
        Dashboard {
            date: "2026-01-05".to_string(),
            goal: 1500,
            unit: unit.to_string(),
            total: 550,
            percent: 37,
            trend: Vec::new(),
            log: Vec::new(),
            notify_on: false,
            reminder_label: "Reminders: OFF".to_string(),
        }
    }

    #[test]
    fn index_fills_placeholders() {
        let html = render_index(&dashboard("ml"));
        assert!(html.contains(r#"<span id="date">2026-01-05</span>"#));
        assert!(html.contains(r#"<span id="total">550</span>"#));
        assert!(html.contains("37%"));
        assert!(html.contains("Reminders: OFF"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn unit_label_is_escaped() {
        let html = render_index(&dashboard("<b>oz</b>"));
        assert!(html.contains("&lt;b&gt;oz&lt;/b&gt;"));
        assert!(!html.contains("<b>oz</b>"));
    }

    #[test]
    fn placeholder_text_in_values_is_not_expanded() {
        for unit in ["{{GOAL}}", "{{REMINDER}}", "{{UNIT}}"] {
            let html = render_index(&dashboard(unit));
            assert!(html.contains(&format!(r#"<span class="unit">{unit}</span>"#)), "unit {unit:?}");
            assert!(!html.contains(r#"<span class="unit">1500</span>"#));
            assert!(!html.contains(r#"<span class="unit">Reminders: OFF</span>"#));
        }
    }

    #[test]
    fn reminder_label_with_placeholder_stays_literal() {
        let mut board = dashboard("ml");
        board.reminder_label = "{{TOTAL}}".to_string();
        let html = render_index(&board);
        assert!(html.contains(r#"id="notify-btn">{{TOTAL}}</button>"#));
    }
}
