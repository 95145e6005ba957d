// In-process movie catalog

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::RepositoryError;
use crate::movies::models::{Director, Genre, Movie};
use crate::movies::repository::MovieRepository;

/// Catalog held in memory, kept sorted by title
#[derive(Default)]
pub struct InMemoryMovieRepository {
    movies: RwLock<Vec<Movie>>,
}

impl InMemoryMovieRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_movies(movies: impl IntoIterator<Item = Movie>) -> Self {
        let mut movies: Vec<Movie> = movies.into_iter().collect();
        movies.sort_by(|a, b| a.title.cmp(&b.title));
        Self {
            movies: RwLock::new(movies),
        }
    }

    #[cfg(test)]
    pub async fn insert(&self, movie: Movie) {
        let mut movies = self.movies.write().await;
        let at = movies.partition_point(|m| m.title <= movie.title);
        movies.insert(at, movie);
    }
}

/// Unicode case-insensitive equality, matching Postgres `LOWER(a) = LOWER(b)`
fn same_name(stored: &str, requested: &str) -> bool {
    stored.to_lowercase() == requested.to_lowercase()
}

#[async_trait]
impl MovieRepository for InMemoryMovieRepository {
    async fn list(&self) -> Result<Vec<Movie>, RepositoryError> {
        Ok(self.movies.read().await.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Movie>, RepositoryError> {
        Ok(self.movies.read().await.iter().find(|m| m.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Movie>, RepositoryError> {
        let movies = self.movies.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| movies.iter().find(|m| m.id == *id).cloned())
            .collect())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Movie>, RepositoryError> {
        let movies = self.movies.read().await;
        Ok(movies.iter().find(|m| same_name(&m.title, title)).cloned())
    }

    async fn find_genre(&self, name: &str) -> Result<Option<Genre>, RepositoryError> {
        let movies = self.movies.read().await;
        Ok(movies
            .iter()
            .find(|m| same_name(&m.genre.name, name))
            .map(|m| m.genre.clone()))
    }

    async fn find_director(&self, name: &str) -> Result<Option<Director>, RepositoryError> {
        let movies = self.movies.read().await;
        Ok(movies
            .iter()
            .find(|m| same_name(&m.director.name, name))
            .map(|m| m.director.clone()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn movie(title: &str, genre: &str, director: &str) -> Movie {
        Movie {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: format!("{} description", title),
            genre: Genre {
                name: genre.to_string(),
                description: format!("{} films", genre),
            },
            director: Director {
                name: director.to_string(),
                bio: format!("{} biography", director),
            },
            actors: vec![],
            image_path: None,
            featured: false,
            backdrop_image: None,
        }
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_title() {
        let repo = InMemoryMovieRepository::with_movies([
            movie("Vertigo", "Thriller", "Alfred Hitchcock"),
            movie("Alien", "Horror", "Ridley Scott"),
        ]);
        repo.insert(movie("Psycho", "Horror", "Alfred Hitchcock")).await;

        let titles: Vec<String> = repo.list().await.unwrap().into_iter().map(|m| m.title).collect();
        assert_eq!(titles, ["Alien", "Psycho", "Vertigo"]);
    }

    #[tokio::test]
    async fn test_lookups_are_exact_and_case_insensitive() {
        let repo = InMemoryMovieRepository::with_movies([movie("The Thing", "Horror", "John Carpenter")]);

        assert!(repo.find_by_title("the thing").await.unwrap().is_some());
        assert!(repo.find_by_title("Thing").await.unwrap().is_none());
        assert_eq!(repo.find_genre("HORROR").await.unwrap().unwrap().name, "Horror");
        assert_eq!(
            repo.find_director("john carpenter").await.unwrap().unwrap().bio,
            "John Carpenter biography"
        );
        assert!(repo.find_director("Carpenter").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookups_fold_non_ascii_case() {
        let repo = InMemoryMovieRepository::with_movies([movie("Amélie", "Comédie", "Jean-Pierre Jeunet")]);

        assert!(repo.find_by_title("amélie").await.unwrap().is_some());
        assert!(repo.find_by_title("AMÉLIE").await.unwrap().is_some());
        assert_eq!(repo.find_genre("COMÉDIE").await.unwrap().unwrap().name, "Comédie");
        assert!(repo.find_director("JEAN-PIERRE JEUNET").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_find_by_ids_keeps_requested_order_and_skips_unknown() {
        let alien = movie("Alien", "Horror", "Ridley Scott");
        let heat = movie("Heat", "Crime", "Michael Mann");
        let repo = InMemoryMovieRepository::with_movies([alien.clone(), heat.clone()]);

        let found = repo
            .find_by_ids(&[heat.id, Uuid::new_v4(), alien.id])
            .await
            .unwrap();
        assert_eq!(found, vec![heat, alien]);
    }
}
