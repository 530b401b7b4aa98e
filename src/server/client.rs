// src/server/client.rs

/// URL of the live-reload WebSocket.
pub const LIVERELOAD_PATH: &str = "/__sitepipe/livereload";

/// URL the client script is served from.
pub const CLIENT_PATH: &str = "/__sitepipe/client.js";

const CLIENT_JS: &str = r#"(function () {
  var NOTIFY = __SITEPIPE_NOTIFY__;
  var proto = location.protocol === "https:" ? "wss://" : "ws://";
  var url = proto + location.host + "__SITEPIPE_WS__";
  var wasConnected = false;

  function toast(text) {
    if (!NOTIFY || !document.body) return;
    var el = document.createElement("div");
    el.textContent = text;
    el.style.cssText =
      "position:fixed;right:12px;bottom:12px;z-index:2147483647;padding:6px 12px;" +
      "font:12px sans-serif;color:#fff;background:rgba(0,0,0,.75);border-radius:4px";
    document.body.appendChild(el);
    setTimeout(function () { el.remove(); }, 1200);
  }

  function swapCss(path) {
    var links = document.querySelectorAll('link[rel="stylesheet"]');
    var swapped = false;
    for (var i = 0; i < links.length; i++) {
      var href = new URL(links[i].href, location.href);
      if (href.pathname === path) {
        href.searchParams.set("v", Date.now());
        links[i].href = href.toString();
        swapped = true;
      }
    }
    return swapped;
  }

  function connect() {
    var ws = new WebSocket(url);
    ws.onopen = function () {
      if (wasConnected) {
        location.reload();
      }
      wasConnected = true;
    };
    ws.onmessage = function (ev) {
      var msg = JSON.parse(ev.data);
      if (msg.type === "css" && swapCss(msg.path)) {
        toast("Injected " + msg.path);
        return;
      }
      sessionStorage.setItem("sitepipe-reloaded", "1");
      location.reload();
    };
    ws.onclose = function () {
      setTimeout(connect, 1000);
    };
  }

  if (sessionStorage.getItem("sitepipe-reloaded")) {
    sessionStorage.removeItem("sitepipe-reloaded");
    window.addEventListener("load", function () { toast("Reloaded"); });
  }
  connect();
})();
"#;

/// Client script with the server settings baked in.
pub fn client_js(notify: bool) -> String {
    CLIENT_JS
        .replace("__SITEPIPE_NOTIFY__", if notify { "true" } else { "false" })
        .replace("__SITEPIPE_WS__", LIVERELOAD_PATH)
}

/// Add the client `<script>` tag before the last `</body>`, or at the end
/// when the document has none.
pub fn inject_client(html: &str) -> String {
    let tag = format!("<script src=\"{CLIENT_PATH}\"></script>");

    match html.to_ascii_lowercase().rfind("</body>") {
        Some(idx) => {
            let mut out = String::with_capacity(html.len() + tag.len());
            out.push_str(&html[..idx]);
            out.push_str(&tag);
            out.push_str(&html[idx..]);
            out
        }
        None => format!("{html}{tag}"),
    }
}
