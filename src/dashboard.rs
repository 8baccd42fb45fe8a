//! Dashboard page
//!
//! Single-page shell: date-range picker, sun banner, 4-row chart and an
//! auto-refresh timer. The page only re-fetches data on the timer; the
//! chrome is built once. Plotting is done client-side by plotly.js from
//! the serialized chart spec.

use crate::config::Config;

/// Render the page with the configured title, picker minimum and
/// refresh interval substituted in.
pub fn render(config: &Config) -> String {
    DASHBOARD_HTML
        .replace("__TITLE__", &config.ui.title)
        .replace("__MIN_DATE__", &config.ui.min_date.to_string())
        .replace(
            "__REFRESH_MS__",
            &(config.service.refresh_interval_secs * 1000).to_string(),
        )
}

const DASHBOARD_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>__TITLE__</title>
    <script src="https://cdn.plot.ly/plotly-2.35.2.min.js" charset="utf-8"></script>
    <style>
        :root {
            --bg: #002b36;
            --surface: #073642;
            --border: #586e75;
            --text: #eee8d5;
            --muted: #93a1a1;
        }
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body {
            font-family: system-ui, -apple-system, sans-serif;
            background: var(--bg);
            color: var(--text);
            min-height: 100vh;
        }
        .container { max-width: 1200px; margin: 0 auto; padding: 1.5rem; }
        h1 { font-size: 1.5rem; text-align: center; margin-bottom: 1rem; }
        .banner {
            text-align: center;
            color: var(--muted);
            font-size: 0.875rem;
            margin-bottom: 0.5rem;
        }
        .controls {
            display: flex;
            justify-content: center;
            gap: 1rem;
            margin-bottom: 1rem;
        }
        .controls label { font-size: 0.875rem; color: var(--muted); }
        .controls input {
            background: var(--surface);
            color: var(--text);
            border: 1px solid var(--border);
            border-radius: 0.25rem;
            padding: 0.25rem 0.5rem;
            margin-left: 0.25rem;
        }
        #chart {
            background: var(--surface);
            border: 1px solid var(--border);
            border-radius: 0.5rem;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>__TITLE__</h1>
        <div class="banner" id="sun-banner"></div>
        <div class="controls">
            <label>From <input type="date" id="start" min="__MIN_DATE__"></label>
            <label>To <input type="date" id="end" min="__MIN_DATE__"></label>
        </div>
        <div class="banner" id="range-banner"></div>
        <div id="chart"></div>
    </div>
    <script>
        const REFRESH_MS = __REFRESH_MS__;
        const PANEL_AXES = [["x", "y"], ["x2", "y2"], ["x3", "y3"], ["x4", "y4"]];

        function isoDate(d) {
            return d.toISOString().slice(0, 10);
        }

        async function loadChart() {
            const start = document.getElementById("start").value;
            const end = document.getElementById("end").value;
            const res = await fetch(`/api/chart?start=${start}&end=${end}`);
            if (!res.ok) {
                console.error("chart fetch failed:", res.status);
                return;
            }
            const body = await res.json();
            document.getElementById("range-banner").textContent = body.range;

            const traces = [];
            body.panels.forEach((panel, i) => {
                const [xaxis, yaxis] = PANEL_AXES[i];
                for (const s of panel.series) {
                    traces.push({
                        type: "scatter",
                        mode: "lines",
                        name: s.name,
                        x: s.x,
                        y: s.y,
                        visible: s.visibility === "legendonly" ? "legendonly" : true,
                        xaxis: xaxis,
                        yaxis: yaxis,
                    });
                }
            });

            const layout = {
                height: 1090,
                grid: { rows: 4, columns: 1, pattern: "independent" },
                legend: { title: { text: "Legend" } },
                paper_bgcolor: "#073642",
                plot_bgcolor: "#073642",
                font: { color: "#eee8d5" },
                xaxis2: { matches: "x" },
                xaxis3: { matches: "x" },
                xaxis4: { matches: "x" },
            };
            Plotly.react("chart", traces, layout, { responsive: true });
        }

        async function loadSun() {
            const res = await fetch("/api/sun");
            if (res.ok) {
                const body = await res.json();
                document.getElementById("sun-banner").textContent = body.info;
            }
        }

        function init() {
            const today = new Date();
            const tomorrow = new Date(today.getTime() + 86400000);
            document.getElementById("start").value = isoDate(today);
            document.getElementById("end").value = isoDate(tomorrow);
            document.getElementById("start").addEventListener("change", loadChart);
            document.getElementById("end").addEventListener("change", loadChart);

            loadSun();
            loadChart();
            // Refresh data only; the page chrome is never rebuilt.
            setInterval(() => { loadSun(); loadChart(); }, REFRESH_MS);
        }

        init();
    </script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests_support::sample_config;

    #[test]
    fn test_render_substitutes_placeholders() {
        let mut config = sample_config();
        config.ui.title = "Attic dashboard".to_string();
        config.service.refresh_interval_secs = 600;

        let html = render(&config);
        assert!(html.contains("<title>Attic dashboard</title>"));
        assert!(html.contains("min=\"2019-05-01\""));
        assert!(html.contains("const REFRESH_MS = 600000;"));
        assert!(!html.contains("__TITLE__"));
        assert!(!html.contains("__REFRESH_MS__"));
    }
}
