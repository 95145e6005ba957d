use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Genre {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Director {
    pub name: String,
    pub bio: String,
}

/// A catalog entry with its genre and director embedded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub genre: Genre,
    pub director: Director,
    pub actors: Vec<String>,
    pub image_path: Option<String>,
    pub featured: bool,
    pub backdrop_image: Option<String>,
}

/// Flat row shape of the `movies` table
#[derive(Debug, FromRow)]
pub struct MovieRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub genre_name: String,
    pub genre_description: String,
    pub director_name: String,
    pub director_bio: String,
    pub actors: Vec<String>,
    pub image_path: Option<String>,
    pub featured: bool,
    pub backdrop_image: Option<String>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            genre: Genre {
                name: row.genre_name,
                description: row.genre_description,
            },
            director: Director {
                name: row.director_name,
                bio: row.director_bio,
            },
            actors: row.actors,
            image_path: row.image_path,
            featured: row.featured,
            backdrop_image: row.backdrop_image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_nests_genre_and_director() {
        let row = MovieRow {
            id: Uuid::new_v4(),
            title: "Alien".to_string(),
            description: "In space no one can hear you scream.".to_string(),
            genre_name: "Horror".to_string(),
            genre_description: "Made to frighten.".to_string(),
            director_name: "Ridley Scott".to_string(),
            director_bio: "English filmmaker.".to_string(),
            actors: vec!["Sigourney Weaver".to_string()],
            image_path: None,
            featured: true,
            backdrop_image: None,
        };

        let movie = Movie::from(row);
        let json = serde_json::to_value(&movie).unwrap();
        assert_eq!(json["genre"]["name"], "Horror");
        assert_eq!(json["director"]["bio"], "English filmmaker.");
        assert_eq!(json["actors"][0], "Sigourney Weaver");
        assert!(json.get("genre_name").is_none());
    }
}
