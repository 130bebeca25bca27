//! Templates Handlebars, embarqués dans le binaire.

use handlebars::{Handlebars, TemplateError};

const PARTIALS: [(&str, &str); 4] = [
    ("layout", include_str!("../templates/layout.hbs")),
    ("nav", include_str!("../templates/nav.hbs")),
    ("alerts", include_str!("../templates/alerts.hbs")),
    ("form", include_str!("../templates/form.hbs")),
];

const PAGES: [(&str, &str); 8] = [
    ("index", include_str!("../templates/index.hbs")),
    ("signup", include_str!("../templates/signup.hbs")),
    ("signin", include_str!("../templates/signin.hbs")),
    ("dashboard", include_str!("../templates/dashboard.hbs")),
    ("profile", include_str!("../templates/profile.hbs")),
    ("password", include_str!("../templates/password.hbs")),
    ("forum", include_str!("../templates/forum.hbs")),
    ("donate", include_str!("../templates/donate.hbs")),
];

/// Enregistre les partials et les pages de l'application.
pub fn registry() -> Result<Handlebars<'static>, TemplateError> {
    let mut hbs = Handlebars::new();
    hbs.set_strict_mode(false);

    for (name, source) in PARTIALS {
        hbs.register_partial(name, source)?;
    }
    for (name, source) in PAGES {
        hbs.register_template_string(name, source)?;
    }

    Ok(hbs)
}
