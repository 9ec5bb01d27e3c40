//! Image readiness inspection.

use tracing::debug;

use crate::cloud::ImageApi;
use crate::errors::{ImageNotReadyError, PromotionError};
use crate::model::Image;

/// Fetches the image description and verifies it is ready to promote.
///
/// Fails with `NotFound` if the provider has no matching image and with
/// [`ImageNotReadyError`] for any non-available state. Both are terminal
/// aborts raised before any tagging or stack mutation. No side effects.
pub async fn describe_ready_image(
    images: &dyn ImageApi,
    image_id: &str,
) -> Result<Image, PromotionError> {
    let image = images
        .describe_image(image_id)
        .await?
        .ok_or_else(|| PromotionError::image_not_found(image_id))?;

    if !image.state.is_available() {
        return Err(ImageNotReadyError::new(&image.image_id, image.state).into());
    }

    debug!(
        image_id = %image.image_id,
        mapping_count = image.block_device_mappings.len(),
        "image is ready for promotion"
    );
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::compute::MockImageApi;
    use crate::model::{BlockDeviceMapping, ImageState};

    #[tokio::test]
    async fn test_missing_image_is_not_found() {
        let mut images = MockImageApi::new();
        images
            .expect_describe_image()
            .withf(|id| id == "img-404")
            .returning(|_| Ok(None));

        let err = describe_ready_image(&images, "img-404").await.unwrap_err();
        assert!(matches!(err, PromotionError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_pending_image_is_not_ready() {
        let mut images = MockImageApi::new();
        images
            .expect_describe_image()
            .returning(|_| Ok(Some(Image::new("img-1", ImageState::Pending))));

        let err = describe_ready_image(&images, "img-1").await.unwrap_err();
        match err {
            PromotionError::ImageNotReady(inner) => {
                assert_eq!(inner.image_id, "img-1");
                assert_eq!(inner.state, ImageState::Pending);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_available_image_is_returned() {
        let mut images = MockImageApi::new();
        images.expect_describe_image().returning(|_| {
            Ok(Some(
                Image::new("img-1", ImageState::Available).with_mapping(
                    BlockDeviceMapping::snapshot_backed("/dev/sda1", "snap-1"),
                ),
            ))
        });

        let image = describe_ready_image(&images, "img-1").await.unwrap();
        assert_eq!(image.image_id, "img-1");
        assert_eq!(image.snapshot_ids(), vec!["snap-1"]);
    }
}
