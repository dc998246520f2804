use super::self_prelude::*;

/// Kinds of a small user directory with notes and to-dos.
pub fn fixture_kind_defs() -> Vec<Kind> {
    vec![
        Kind::new("User")
            .field(FieldDef::text("full_name").sortable())
            .field(FieldDef::text("email"))
            .field(FieldDef::link("language", "Language"))
            .field(FieldDef::table("roles", "Has Role")),
        Kind::child("Has Role").field(FieldDef::link("role", "Role")),
        Kind::new("Role").field(FieldDef::text("role_name")),
        Kind::new("Language").field(FieldDef::text("language_name")),
        Kind::new("Note")
            .field(FieldDef::text("title").sortable())
            .field(FieldDef::text("content").translatable()),
        Kind::new("ToDo")
            .field(FieldDef::text("description"))
            .field(FieldDef::text("status").sortable())
            .field(FieldDef::int("priority").sortable())
            .field(FieldDef::text("reference_type"))
            .field(FieldDef::dynamic_link("reference_name", "reference_type")),
    ]
}

pub fn fixture_kinds() -> KindMap {
    KindMap::build(fixture_kind_defs()).unwrap()
}
