//! Static page: controls are filled from `/api/options`, charts are redrawn
//! from `/api/box` and `/api/scatter` on every control change.

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Project Morey &#127944; &#128200;</title>
<script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
<style>
  body { font-family: sans-serif; margin: 1.5rem; }
  .controls { width: 90%; display: inline-block; }
  .controls label { display: inline-block; margin-right: 0.8rem; }
  .controls p { margin: 0.6rem 0 0.2rem; font-weight: bold; }
  .error { color: #b00020; }
</style>
</head>
<body>
<h1>Project Morey &#127944; &#128200;</h1>
<div id="error" class="error"></div>
<div id="zscore_box"></div>
<div class="controls">
  <p>Positions:</p><div id="position-checklist"></div>
  <p>Year:</p><div id="year-picker"></div>
  <p>Upper box metric:</p><select id="top-metric"></select>
  <p>Lower box metric:</p><select id="bottom-metric"></select>
</div>
<div id="scatter_matrix"></div>
<div class="controls">
  <p>Scatter matrix dimensions:</p><select id="scatter-dims" multiple size="6"></select>
</div>
<script>
const $ = (id) => document.getElementById(id);

function checkbox(name, value, checked, type) {
  const label = document.createElement("label");
  const input = document.createElement("input");
  input.type = type;
  input.name = name;
  input.value = value;
  input.checked = checked;
  input.addEventListener("change", refresh);
  label.appendChild(input);
  label.appendChild(document.createTextNode(" " + value));
  return label;
}

function fillSelect(select, metrics, selected) {
  for (const m of metrics) {
    const opt = document.createElement("option");
    opt.value = m.value;
    opt.textContent = m.label;
    opt.selected = selected.includes(m.value);
    select.appendChild(opt);
  }
  select.addEventListener("change", refresh);
}

function params() {
  const positions = [...document.querySelectorAll("input[name=position]:checked")].map((i) => i.value);
  const year = document.querySelector("input[name=year]:checked");
  const p = new URLSearchParams();
  p.set("positions", positions.join(","));
  if (year) p.set("year", year.value);
  return p;
}

async function draw(target, url) {
  const resp = await fetch(url);
  if (!resp.ok) {
    $("error").textContent = await resp.text();
    return;
  }
  $("error").textContent = "";
  const fig = await resp.json();
  Plotly.react(target, fig.data, fig.layout);
}

function refresh() {
  const box = params();
  box.set("top", $("top-metric").value);
  box.set("bottom", $("bottom-metric").value);
  draw("zscore_box", "/api/box?" + box.toString());

  const scatter = params();
  const dims = [...$("scatter-dims").selectedOptions].map((o) => o.value);
  scatter.set("dims", dims.join(","));
  draw("scatter_matrix", "/api/scatter?" + scatter.toString());
}

async function init() {
  const opts = await (await fetch("/api/options")).json();
  for (const pos of opts.positions) {
    $("position-checklist").appendChild(checkbox("position", pos, true, "checkbox"));
  }
  for (const year of opts.years) {
    $("year-picker").appendChild(checkbox("year", year, year === opts.default_year, "radio"));
  }
  fillSelect($("top-metric"), opts.metrics, [opts.default_top]);
  fillSelect($("bottom-metric"), opts.metrics, [opts.default_bottom]);
  fillSelect($("scatter-dims"), opts.metrics, opts.default_dimensions);
  refresh();
}

init();
</script>
</body>
</html>
"#;
