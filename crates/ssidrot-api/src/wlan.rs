// WLAN configuration endpoints
//
// `rest/wlanconf` is site-scoped. Updates are full-object PUTs: the caller
// sends back everything it read, with only the fields it means to change
// modified.

use tracing::debug;

use crate::client::UnifiClient;
use crate::error::Error;
use crate::models::WlanConf;

impl UnifiClient {
    /// List every WLAN configured on the site.
    ///
    /// `GET /api/s/{site}/rest/wlanconf`
    pub async fn list_wlans(&self) -> Result<Vec<WlanConf>, Error> {
        let url = self.site_url("rest/wlanconf")?;
        debug!("listing WLANs");
        self.get(url).await
    }

    /// Fetch a single WLAN by id.
    ///
    /// `GET /api/s/{site}/rest/wlanconf/{id}`
    pub async fn get_wlan(&self, id: &str) -> Result<WlanConf, Error> {
        let url = self.site_url(&format!("rest/wlanconf/{id}"))?;
        debug!(id, "fetching WLAN");
        let data: Vec<WlanConf> = self.get(url).await?;
        data.into_iter().next().ok_or_else(|| Error::NotFound {
            resource: format!("wlanconf/{id}"),
        })
    }

    /// Replace a WLAN's configuration with `wlan`.
    ///
    /// `PUT /api/s/{site}/rest/wlanconf/{id}` with the full object. Returns
    /// the object the controller echoes back, or `wlan` itself when the
    /// controller answers with an empty `data` array.
    pub async fn update_wlan(&self, id: &str, wlan: &WlanConf) -> Result<WlanConf, Error> {
        let url = self.site_url(&format!("rest/wlanconf/{id}"))?;
        debug!(id, name = %wlan.name, "updating WLAN");
        let data: Vec<WlanConf> = self.put(url, wlan).await?;
        Ok(data.into_iter().next().unwrap_or_else(|| {
            debug!(id, "controller returned no WLAN body on update");
            wlan.clone()
        }))
    }
}
