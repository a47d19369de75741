//! Service-level behaviour of recipe synchronisation and image upload.

use super::*;
use crate::domain::ports::{AttributeCatalogue, MockImageStore};
use crate::domain::{
    AttributeName, AttributeService, AttributeSpec, CookingTime, ErrorCode, RecipeFields,
    RecipeLink, Title,
};
use crate::outbound::memory::MemoryRecipeStore;
use rstest::{fixture, rstest};

type Service = RecipeService<MemoryRecipeStore, MockImageStore>;

struct Harness {
    store: Arc<MemoryRecipeStore>,
    service: Service,
    owner: UserId,
}

fn harness_with(images: MockImageStore) -> Harness {
    let store = Arc::new(MemoryRecipeStore::default());
    Harness {
        service: RecipeService::new(store.clone(), Arc::new(images)),
        store,
        owner: UserId::random(),
    }
}

#[fixture]
fn harness() -> Harness {
    harness_with(MockImageStore::new())
}

fn specs(names: &[&str]) -> Vec<AttributeSpec> {
    names
        .iter()
        .map(|name| AttributeSpec::new(AttributeName::new(*name).expect("name")))
        .collect()
}

fn draft(title: &str, tags: &[&str], ingredients: &[&str]) -> RecipeDraft {
    RecipeDraft {
        fields: RecipeFields {
            title: Title::new(title).expect("title"),
            description: String::new(),
            time_minutes: CookingTime::new(10).expect("time"),
            price: "5.50".parse().expect("price"),
            link: RecipeLink::default(),
        },
        tags: specs(tags),
        ingredients: specs(ingredients),
    }
}

fn names(attributes: &[crate::domain::RecipeAttribute]) -> Vec<&str> {
    attributes.iter().map(|attr| attr.name().as_ref()).collect()
}

#[rstest]
#[tokio::test]
async fn creating_recipes_reuses_existing_tags(harness: Harness) {
    let soup = harness
        .service
        .create(&harness.owner, draft("Soup", &["Vegan"], &["Leek"]))
        .await
        .expect("create soup");
    let salad = harness
        .service
        .create(&harness.owner, draft("Salad", &["Vegan", "Quick"], &[]))
        .await
        .expect("create salad");

    assert_eq!(names(soup.tags()), vec!["Vegan"]);
    assert_eq!(names(soup.ingredients()), vec!["Leek"]);
    assert_eq!(salad.tags().len(), 2);
    assert_eq!(salad.tags()[0].id(), soup.tags()[0].id());

    let catalogue = AttributeService::new(harness.store.clone());
    let tags = catalogue
        .list(&harness.owner, AttributeKind::Tag, false)
        .await
        .expect("tags");
    assert_eq!(tags.len(), 2);
}

#[rstest]
#[tokio::test]
async fn duplicate_specs_link_once(harness: Harness) {
    let recipe = harness
        .service
        .create(&harness.owner, draft("Soup", &["Vegan", "Vegan"], &[]))
        .await
        .expect("create");
    assert_eq!(recipe.tags().len(), 1);
}

#[rstest]
#[tokio::test]
async fn empty_tag_list_clears_and_absent_key_keeps(harness: Harness) {
    let recipe = harness
        .service
        .create(&harness.owner, draft("Soup", &["Vegan"], &["Leek"]))
        .await
        .expect("create");

    let untouched = harness
        .service
        .update(
            &harness.owner,
            recipe.id(),
            RecipeChanges {
                title: Some(Title::new("Leek soup").expect("title")),
                ..RecipeChanges::default()
            },
        )
        .await
        .expect("scalar update");
    assert_eq!(untouched.title().as_ref(), "Leek soup");
    assert_eq!(names(untouched.tags()), vec!["Vegan"]);

    let cleared = harness
        .service
        .update(
            &harness.owner,
            recipe.id(),
            RecipeChanges {
                tags: Some(Vec::new()),
                ..RecipeChanges::default()
            },
        )
        .await
        .expect("clear tags");
    assert!(cleared.tags().is_empty());
    assert_eq!(names(cleared.ingredients()), vec!["Leek"]);
}

#[rstest]
#[tokio::test]
async fn replacing_tags_swaps_links(harness: Harness) {
    let recipe = harness
        .service
        .create(&harness.owner, draft("Soup", &["Vegan"], &[]))
        .await
        .expect("create");
    let updated = harness
        .service
        .update(
            &harness.owner,
            recipe.id(),
            RecipeChanges {
                tags: Some(specs(&["Lunch"])),
                ..RecipeChanges::default()
            },
        )
        .await
        .expect("replace tags");
    assert_eq!(names(updated.tags()), vec!["Lunch"]);
}

#[rstest]
#[tokio::test]
async fn other_users_cannot_touch_recipes(harness: Harness) {
    let recipe = harness
        .service
        .create(&harness.owner, draft("Soup", &[], &[]))
        .await
        .expect("create");
    let intruder = UserId::random();

    let get = harness.service.get(&intruder, recipe.id()).await;
    let update = harness
        .service
        .update(
            &intruder,
            recipe.id(),
            RecipeChanges {
                tags: Some(specs(&["Stolen"])),
                ..RecipeChanges::default()
            },
        )
        .await;
    let delete = harness.service.delete(&intruder, recipe.id()).await;

    for result in [get.map(|_| ()), update.map(|_| ()), delete] {
        assert_eq!(result.expect_err("must fail").code(), ErrorCode::NotFound);
    }
    let intruder_tags = AttributeService::new(harness.store.clone())
        .list(&intruder, AttributeKind::Tag, false)
        .await
        .expect("tags");
    assert!(intruder_tags.is_empty(), "failed update created no tags");
    assert!(harness.service.get(&harness.owner, recipe.id()).await.is_ok());
}

#[rstest]
#[tokio::test]
async fn list_filters_by_tag_ids(harness: Harness) {
    let vegan = harness
        .service
        .create(&harness.owner, draft("Soup", &["Vegan"], &[]))
        .await
        .expect("soup");
    harness
        .service
        .create(&harness.owner, draft("Steak", &["Meat"], &[]))
        .await
        .expect("steak");
    let listed = harness
        .service
        .list(
            &harness.owner,
            RecipeFilter {
                tags: vec![vegan.tags()[0].id()],
                ingredients: Vec::new(),
            },
        )
        .await
        .expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id(), vegan.id());
}

#[rstest]
#[tokio::test]
async fn image_upload_for_foreign_recipe_is_not_found() {
    let mut images = MockImageStore::new();
    images.expect_save().times(0);
    let harness = harness_with(images);
    let recipe = harness
        .service
        .create(&harness.owner, draft("Soup", &[], &[]))
        .await
        .expect("create");
    let upload = ImageUpload::try_new("dish.png", "image/png", vec![1, 2, 3], 1024).expect("upload");

    let err = harness
        .service
        .upload_image(&UserId::random(), recipe.id(), upload)
        .await
        .expect_err("foreign upload");
    assert_eq!(err.code(), ErrorCode::NotFound);
    let reloaded = harness
        .service
        .get(&harness.owner, recipe.id())
        .await
        .expect("recipe");
    assert!(reloaded.image().is_none());
}

#[rstest]
#[tokio::test]
async fn replacing_an_image_removes_the_previous_file() {
    let mut images = MockImageStore::new();
    images.expect_save().times(2).returning(|_, _| Ok(()));
    images
        .expect_remove()
        .withf(|path| path.starts_with("uploads/recipe/") && path.ends_with(".png"))
        .times(1)
        .returning(|_| Ok(()));
    let harness = harness_with(images);
    let recipe = harness
        .service
        .create(&harness.owner, draft("Soup", &[], &[]))
        .await
        .expect("create");

    let first = harness
        .service
        .upload_image(
            &harness.owner,
            recipe.id(),
            ImageUpload::try_new("a.png", "image/png", vec![1], 16).expect("upload"),
        )
        .await
        .expect("first upload");
    let second = harness
        .service
        .upload_image(
            &harness.owner,
            recipe.id(),
            ImageUpload::try_new("b.jpg", "image/jpeg", vec![2], 16).expect("upload"),
        )
        .await
        .expect("second upload");

    assert!(first.image().is_some_and(|path| path.ends_with(".png")));
    assert!(second.image().is_some_and(|path| path.ends_with(".jpg")));
}

#[rstest]
#[tokio::test]
async fn storage_failures_surface_as_unavailable() {
    let mut images = MockImageStore::new();
    images
        .expect_save()
        .returning(|_, _| Err(ImageStoreError::io("disk full")));
    let harness = harness_with(images);
    let recipe = harness
        .service
        .create(&harness.owner, draft("Soup", &[], &[]))
        .await
        .expect("create");

    let err = harness
        .service
        .upload_image(
            &harness.owner,
            recipe.id(),
            ImageUpload::try_new("a.png", "image/png", vec![1], 16).expect("upload"),
        )
        .await
        .expect_err("save fails");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn deleting_a_recipe_with_an_image_removes_the_file() {
    let mut images = MockImageStore::new();
    images.expect_save().returning(|_, _| Ok(()));
    images.expect_remove().times(1).returning(|_| Ok(()));
    let harness = harness_with(images);
    let recipe = harness
        .service
        .create(&harness.owner, draft("Soup", &[], &[]))
        .await
        .expect("create");
    harness
        .service
        .upload_image(
            &harness.owner,
            recipe.id(),
            ImageUpload::try_new("a.png", "image/png", vec![1], 16).expect("upload"),
        )
        .await
        .expect("upload");

    harness
        .service
        .delete(&harness.owner, recipe.id())
        .await
        .expect("delete");
    let err = harness
        .service
        .get(&harness.owner, recipe.id())
        .await
        .expect_err("gone");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn remove_failures_do_not_fail_the_upload() {
    let mut images = MockImageStore::new();
    images.expect_save().returning(|_, _| Ok(()));
    images
        .expect_remove()
        .returning(|_| Err(ImageStoreError::io("permission denied")));
    let harness = harness_with(images);
    let recipe = harness
        .service
        .create(&harness.owner, draft("Soup", &[], &[]))
        .await
        .expect("create");
    for name in ["a.png", "b.png"] {
        harness
            .service
            .upload_image(
                &harness.owner,
                recipe.id(),
                ImageUpload::try_new(name, "image/png", vec![1], 16).expect("upload"),
            )
            .await
            .expect("upload succeeds despite cleanup failure");
    }
}
