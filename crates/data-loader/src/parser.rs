//! Parsers for the catalog data files.
//!
//! - movies.csv: movie_id,genres,release_year,runtime,vote_average,language,adult
//! - language_codes.csv: Language_code,Language_name
//! - genres_details.csv: Genre_id,Genre_name
//!
//! Genre lists are stored `|`-delimited inside one cell ("Action|Adventure").

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

pub const MOVIES_HEADER: [&str; 7] = [
    "movie_id",
    "genres",
    "release_year",
    "runtime",
    "vote_average",
    "language",
    "adult",
];
pub const LANGUAGES_HEADER: [&str; 2] = ["Language_code", "Language_name"];
pub const GENRES_HEADER: [&str; 2] = ["Genre_id", "Genre_name"];

/// Delimiter between labels inside the genres cell
pub const GENRE_DELIMITER: char = '|';

/// One movies.csv row as written. Year and runtime are read as floats since
/// pandas exports write integer columns with missing values as `120.0`.
#[derive(Debug, Deserialize)]
struct MovieRow {
    movie_id: u32,
    genres: String,
    release_year: Option<f64>,
    runtime: Option<f64>,
    vote_average: Option<f32>,
    language: Option<String>,
    adult: String,
}

#[derive(Debug, Deserialize)]
struct LanguageRow {
    code: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct GenreRow {
    id: u32,
    name: String,
}

/// Open `path`, check its header row against `header`, and deserialize every
/// data row, paired with its 1-based line number.
fn read_rows<T: DeserializeOwned>(path: &Path, header: &[&str]) -> Result<Vec<(usize, T)>> {
    let file = file_name(path);
    let input = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let found: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(&file, header, 1, e))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    if found != header {
        return Err(DataLoadError::HeaderMismatch {
            file,
            expected: header.iter().map(|s| s.to_string()).collect(),
            found,
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(&file, header, 0, e))?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        let row = record
            .deserialize(None)
            .map_err(|e| csv_error(&file, header, line, e))?;
        rows.push((line, row));
    }
    Ok(rows)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Translate a csv error into a line-numbered `ParseError`, naming the column
/// when the failure is a bad cell. `line` is used when the error has no position.
fn csv_error(file: &str, header: &[&str], line: usize, err: csv::Error) -> DataLoadError {
    let line_of = |pos: Option<&csv::Position>| pos.map_or(line, |p| p.line() as usize);
    let (line, reason) = match err.into_kind() {
        csv::ErrorKind::Io(e) => return DataLoadError::IoError(e),
        csv::ErrorKind::Deserialize { pos, err } => {
            let reason = match err.field().and_then(|i| header.get(i as usize)) {
                Some(column) => format!("Invalid {}: {}", column, err.kind()),
                None => err.kind().to_string(),
            };
            (line_of(pos.as_ref()), reason)
        }
        csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => (
            line_of(pos.as_ref()),
            format!("expected {} fields, found {}", expected_len, len),
        ),
        csv::ErrorKind::Utf8 { pos, err } => (line_of(pos.as_ref()), err.to_string()),
        other => (line, format!("{:?}", other)),
    };
    DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason,
    }
}

/// Narrow a float cell to a whole number, rejecting fractions and values
/// outside `u16`
fn whole_number(value: Option<f64>, field: &str, file: &str, line: usize) -> Result<Option<u16>> {
    match value {
        None => Ok(None),
        Some(v) if v.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(&v) => Ok(Some(v as u16)),
        Some(v) => Err(DataLoadError::ParseError {
            file: file.to_string(),
            line,
            reason: format!("Invalid {}: {} is not a whole number in range", field, v),
        }),
    }
}

/// Parse the adult flag: 0/1/true/false, empty = false
fn parse_adult(s: &str) -> Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "" | "0" | "false" => Ok(false),
        "1" | "true" => Ok(true),
        _ => Err(DataLoadError::InvalidValue {
            field: "adult".to_string(),
            value: s.to_string(),
        }),
    }
}

/// Parse a delimited genre list
///
/// Example: "Action|Adventure" -> vec!["Action", "Adventure"]
///          "" -> vec![]
pub fn parse_genre_list(s: &str) -> Vec<String> {
    s.split(GENRE_DELIMITER)
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse the movies.csv file
pub fn parse_movies(path: &Path) -> Result<Vec<MovieRecord>> {
    let file = file_name(path);
    let rows: Vec<(usize, MovieRow)> = read_rows(path, &MOVIES_HEADER)?;
    let mut movies = Vec::with_capacity(rows.len());

    for (line, row) in rows {
        movies.push(MovieRecord {
            id: row.movie_id,
            genres: parse_genre_list(&row.genres),
            release_year: whole_number(row.release_year, "release_year", &file, line)?,
            runtime: whole_number(row.runtime, "runtime", &file, line)?,
            vote_average: row.vote_average,
            language: row.language.filter(|code| !code.is_empty()),
            adult: parse_adult(&row.adult)?,
        });
    }

    Ok(movies)
}

/// Parse the language_codes.csv file
pub fn parse_languages(path: &Path) -> Result<LanguageTable> {
    let file = file_name(path);
    let rows: Vec<(usize, LanguageRow)> = read_rows(path, &LANGUAGES_HEADER)?;
    let mut entries = Vec::with_capacity(rows.len());

    for (line, row) in rows {
        if row.code.is_empty() || row.name.is_empty() {
            return Err(DataLoadError::ParseError {
                file: file.clone(),
                line,
                reason: "Missing language code or name".to_string(),
            });
        }
        entries.push(Language {
            code: row.code,
            name: row.name,
        });
    }

    Ok(LanguageTable::new(entries))
}

/// Parse the genres_details.csv file
pub fn parse_genre_details(path: &Path) -> Result<GenreTable> {
    let rows: Vec<(usize, GenreRow)> = read_rows(path, &GENRES_HEADER)?;
    let entries = rows
        .into_iter()
        .map(|(_, row)| GenreDetails {
            id: row.id,
            name: row.name,
        })
        .collect();

    Ok(GenreTable::new(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}", uuid::Uuid::new_v4(), name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_genre_list() {
        assert_eq!(parse_genre_list("Action|Adventure"), vec!["Action", "Adventure"]);
        assert_eq!(parse_genre_list(" Drama "), vec!["Drama"]);
        assert!(parse_genre_list("").is_empty());
    }

    #[test]
    fn test_parse_adult() {
        assert!(!parse_adult("0").unwrap());
        assert!(parse_adult("TRUE").unwrap());
        assert!(!parse_adult("").unwrap());
        assert!(parse_adult("maybe").is_err());
    }

    #[test]
    fn test_parse_movies() {
        let path = write_temp(
            "movies.csv",
            "movie_id,genres,release_year,runtime,vote_average,language,adult\n\
             27205,Action|Science Fiction|Adventure,2010,148,8.4,en,0\n\
             \n\
             12,,2003,,7.8,,1\n",
        );

        let movies = parse_movies(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].id, 27205);
        assert_eq!(movies[0].genres.len(), 3);
        assert_eq!(movies[0].runtime, Some(148));
        assert_eq!(movies[0].language.as_deref(), Some("en"));

        assert!(movies[1].genres.is_empty());
        assert_eq!(movies[1].runtime, None);
        assert_eq!(movies[1].language, None);
        assert!(movies[1].adult);
    }

    #[test]
    fn test_parse_movies_reports_line_of_bad_number() {
        let path = write_temp(
            "movies.csv",
            "movie_id,genres,release_year,runtime,vote_average,language,adult\n\
             1,Drama,2010,long,8.4,en,0\n",
        );

        let err = parse_movies(&path).unwrap_err();
        fs::remove_file(&path).ok();

        match err {
            DataLoadError::ParseError { line, reason, .. } => {
                assert_eq!(line, 2);
                assert!(reason.contains("runtime"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_movies_rejects_wrong_header() {
        let path = write_temp("movies.csv", "id,title\n1,Heat\n");
        let err = parse_movies(&path).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(matches!(err, DataLoadError::HeaderMismatch { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = parse_languages(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }

    #[test]
    fn test_parse_languages_and_genres() {
        let languages = write_temp("language_codes.csv", "Language_code,Language_name\nen,english\nja,japanese\n");
        let genres = write_temp("genres_details.csv", "Genre_id,Genre_name\n28,Action\n18,Drama\n");

        let language_table = parse_languages(&languages).unwrap();
        let genre_table = parse_genre_details(&genres).unwrap();
        fs::remove_file(&languages).ok();
        fs::remove_file(&genres).ok();

        assert_eq!(language_table.code_for_name("Japanese"), Some("ja"));
        assert_eq!(genre_table.name_for_id(18), Some("Drama"));
    }

    #[test]
    fn test_quoted_cells_with_commas() {
        let path = write_temp(
            "language_codes.csv",
            "Language_code,Language_name\nen,English\nnr,\"Ndebele, South\"\n",
        );
        let table = parse_languages(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(table.len(), 2);
        assert_eq!(table.name_for_code("nr"), Some("Ndebele, South"));
        assert_eq!(table.code_for_name("ndebele, south"), Some("nr"));
    }

    #[test]
    fn test_parse_movies_float_columns() {
        let path = write_temp(
            "movies.csv",
            "movie_id,genres,release_year,runtime,vote_average,language,adult\n\
             1,\"Action|Drama\",2010.0,120.0,7.5,en,0\n\
             2,Comedy,,,,fr,false\n",
        );

        let movies = parse_movies(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(movies[0].genres, vec!["Action", "Drama"]);
        assert_eq!(movies[0].release_year, Some(2010));
        assert_eq!(movies[0].runtime, Some(120));
        assert_eq!(movies[1].release_year, None);
        assert_eq!(movies[1].vote_average, None);
    }

    #[test]
    fn test_parse_movies_rejects_fractional_runtime() {
        let path = write_temp(
            "movies.csv",
            "movie_id,genres,release_year,runtime,vote_average,language,adult\n\
             1,Drama,2010,120,8.4,en,0\n\
             2,Drama,2010,95.5,8.4,en,0\n",
        );

        let err = parse_movies(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert!(matches!(err, DataLoadError::ParseError { line: 3, .. }));
    }

    #[test]
    fn test_parse_movies_reports_field_count() {
        let path = write_temp(
            "movies.csv",
            "movie_id,genres,release_year,runtime,vote_average,language,adult\n\
             1,Drama,2010,120\n",
        );

        let err = parse_movies(&path).unwrap_err();
        fs::remove_file(&path).ok();

        match err {
            DataLoadError::ParseError { line, reason, .. } => {
                assert_eq!(line, 2);
                assert!(reason.contains("expected 7 fields"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
