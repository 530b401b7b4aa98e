#![allow(dead_code)]

pub use sitepipe_test_utils::builders::SiteConfigBuilder;
pub use sitepipe_test_utils::project::TestProject;
pub use sitepipe_test_utils::{init_tracing, with_timeout};

/// A small site in the stock `src/` layout: one stylesheet with a partial,
/// two pages and two scripts sharing `lib/greet.js`.
///
/// The default script glob also picks up `lib/greet.js` as an entry; narrow
/// it with `script_input("src/scripts/*.js")` to get just the two.
pub fn sample_site() -> TestProject {
    let project = TestProject::new();
    project
        .write("src/sass/_vars.scss", "$accent: #c0ffee;\n")
        .write(
            "src/sass/main.scss",
            "@use 'vars';\n.card {\n  color: vars.$accent;\n  .title { user-select: none; }\n}\n",
        )
        .write(
            "src/views/index.html",
            "<!DOCTYPE html>\n<html>\n  <head>\n    <title>Home</title>\n    <link rel=\"stylesheet\" href=\"/css/main.css\">\n  </head>\n  <body>\n    <p>Hello   world</p>\n  </body>\n</html>\n",
        )
        .write("src/views/about/team.html", "<div>\n  <p>Team</p>\n</div>\n")
        .write(
            "src/scripts/app.js",
            "var greet = require('./lib/greet');\nconst el = document.body;\nel.textContent = greet('app');\n",
        )
        .write(
            "src/scripts/admin.js",
            "var greet = require('./lib/greet.js');\nconsole.log(greet('admin'));\n",
        )
        .write(
            "src/scripts/lib/greet.js",
            "module.exports = (name) => `hello ${name}`;\n",
        );
    project
}
