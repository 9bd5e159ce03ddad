use actix_web::{http::header, web, HttpResponse};
use serde_derive::Deserialize;
use serde_json::json;

use crate::{
    errors::ServerError,
    models::note::{NoteView, MAX_NOTE_SIZE},
    store::NoteStore,
};

#[derive(Clone, Deserialize)]
pub struct NewNote {
    content: String,
    password: Option<String>,
    allow_deletion: Option<bool>,
}

pub async fn new(
    input: web::Json<NewNote>,
    store: web::Data<NoteStore>,
) -> Result<HttpResponse, ServerError> {
    let NewNote {
        content,
        password,
        allow_deletion,
    } = input.into_inner();
    if content.len() > MAX_NOTE_SIZE {
        return Ok(HttpResponse::PayloadTooLarge().body(format!(
            "note content is larger than {MAX_NOTE_SIZE} bytes"
        )));
    }
    let store = store.into_inner();

    let note = web::block(move || {
        store.create(
            &content,
            password.as_deref(),
            allow_deletion.unwrap_or(false),
        )
    })
    .await??;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/notes/{}", note.id)))
        .json(json!({
            "id": note.id,
            "can_delete": note.can_delete,
            "password_protected": note.is_protected(),
        })))
}

pub async fn get(
    note_id: web::Path<String>,
    store: web::Data<NoteStore>,
) -> Result<HttpResponse, ServerError> {
    let store = store.into_inner();

    let (note, locked) = web::block(move || store.fetch(&note_id)).await??;
    let view = if locked {
        NoteView::locked(note)
    } else {
        NoteView::unlocked(note)
    };
    Ok(HttpResponse::Ok().json(view))
}

#[derive(Deserialize)]
pub struct PasswordField {
    password: String,
}

pub async fn unlock(
    note_id: web::Path<String>,
    input: web::Json<PasswordField>,
    store: web::Data<NoteStore>,
) -> Result<HttpResponse, ServerError> {
    let store = store.into_inner();
    let password = input.into_inner().password;

    let note = web::block(move || store.unlock(&note_id, &password)).await??;
    Ok(HttpResponse::Ok().json(NoteView::unlocked(note)))
}

#[derive(Deserialize)]
pub struct ConfirmField {
    confirm: String,
}

pub async fn del(
    note_id: web::Path<String>,
    input: web::Json<ConfirmField>,
    store: web::Data<NoteStore>,
) -> Result<HttpResponse, ServerError> {
    let store = store.into_inner();
    let note_id = note_id.into_inner();
    let confirm = input.into_inner().confirm;

    let deleted_id = note_id.clone();
    web::block(move || store.delete(&note_id, &confirm)).await??;
    Ok(HttpResponse::Ok().json(json!({ "id": deleted_id })))
}
