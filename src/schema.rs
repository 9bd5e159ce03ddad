table! {
    notes (id) {
        id -> Varchar,
        record -> Bytea,
    }
}
