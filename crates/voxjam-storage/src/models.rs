use crate::schema::setlists;
use crate::schema::songs;

use diesel::prelude::*;

#[derive(Debug, Queryable)]
pub struct SongRow {
  pub seq: i32,
  pub id: String,
  pub title: String,
  pub artist: String,
  pub duration: Option<String>,
  pub status: String,
  pub added_by: String,
  pub created_at: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = songs)]
pub struct NewSongRow<'a> {
  pub id: String,
  pub title: &'a str,
  pub artist: &'a str,
  pub duration: Option<&'a str>,
  pub status: &'a str,
  pub added_by: &'a str,
}

#[derive(Debug, Queryable)]
pub struct SetlistRow {
  pub seq: i32,
  pub id: String,
  pub name: String,
  /// JSON array of song ids.
  pub songs: String,
  pub created_at: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = setlists)]
pub struct NewSetlistRow<'a> {
  pub id: String,
  pub name: &'a str,
  pub songs: String,
}
