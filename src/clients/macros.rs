/// Generates the lookup methods every resource-backed client shares:
/// `get_<entity>` and `list_<entity>s`.
///
/// The client must have an `inner: ResourceClient<$entity>` field and `$error`
/// must implement `From<FrameworkError<$error>>`.
#[macro_export]
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $id:ty, $error:ty, $entity_name_snake:ident) => {
        paste::paste! {
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $entity_name_snake>](&self, id: $id) -> Result<Option<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.inner.get(id).await.map_err(<$error>::from)
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<list_ $entity_name_snake s>](&self) -> Result<Vec<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.inner
                        .list($crate::actor_framework::Filter::all())
                        .await
                        .map_err(<$error>::from)
                }
            }
        }
    };
}
